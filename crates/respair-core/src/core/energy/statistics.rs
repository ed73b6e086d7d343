use super::report::EnergyReport;
use crate::core::models::pair::ResiduePair;
use std::collections::BTreeMap;

/// Summary of one component's observations for one residue pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divisor `count`).
    pub std_dev: f64,
}

impl ComponentStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Observed values of every component for one residue pair.
///
/// Components keep the order in which they were first observed; each one tracks its
/// own count, since a component missing from a frame contributes nothing that frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairSamples {
    components: Vec<(String, Vec<f64>)>,
}

impl PairSamples {
    pub fn record(&mut self, component: &str, value: f64) {
        match self.components.iter_mut().find(|(name, _)| name == component) {
            Some((_, values)) => values.push(value),
            None => self.components.push((component.to_string(), vec![value])),
        }
    }

    pub fn values(&self, component: &str) -> Option<&[f64]> {
        self.components
            .iter()
            .find(|(name, _)| name == component)
            .map(|(_, values)| values.as_slice())
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn summary(&self) -> Vec<(String, ComponentStats)> {
        self.components
            .iter()
            .filter_map(|(name, values)| {
                ComponentStats::from_values(values).map(|stats| (name.clone(), stats))
            })
            .collect()
    }
}

/// Run-scoped accumulator of energy observations, keyed by residue pair.
#[derive(Debug, Clone, Default)]
pub struct EnergyAggregator {
    pairs: BTreeMap<ResiduePair, PairSamples>,
}

impl EnergyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pair: ResiduePair, component: &str, value: f64) {
        self.pairs.entry(pair).or_default().record(component, value);
    }

    pub fn record_report(&mut self, pair: ResiduePair, report: &EnergyReport) {
        for observation in report.observations() {
            self.record(pair, &observation.component, observation.value);
        }
    }

    pub fn samples(&self, pair: ResiduePair) -> Option<&PairSamples> {
        self.pairs.get(&pair)
    }

    pub fn summary(&self, pair: ResiduePair) -> Vec<(String, ComponentStats)> {
        self.samples(pair).map(PairSamples::summary).unwrap_or_default()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&ResiduePair, &PairSamples)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
