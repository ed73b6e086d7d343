use serde::{Deserialize, Serialize};
use tracing::warn;

/// One line-oriented rule of the energy report grammar.
///
/// A stdout line containing `label` yields one observation of `component`, read from
/// the whitespace-separated field at index `field`. Offsets differ per label because
/// the labels themselves span a varying number of words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRule {
    pub label: String,
    pub component: String,
    pub field: usize,
}

impl ReportRule {
    pub fn new(label: &str, component: &str, field: usize) -> Self {
        Self {
            label: label.to_string(),
            component: component.to_string(),
            field,
        }
    }
}

/// The rules matching the intermolecular energy decomposition report.
pub fn default_rules() -> Vec<ReportRule> {
    vec![
        ReportRule::new("Intermolecular Energy :", "Intermolecular Energy", 3),
        ReportRule::new("Van der Waals", "Van der Waals", 3),
        ReportRule::new("Atomic Multipoles", "Atomic Multipoles", 2),
        ReportRule::new("Polarization ", "Polarization", 1),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub component: String,
    pub value: f64,
}

/// All observations scraped from one energy report, in report order.
///
/// A multi-frame structure produces one observation per frame for every component
/// the report prints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyReport {
    observations: Vec<Observation>,
}

impl EnergyReport {
    /// Scans `stdout` line by line. The first rule whose label occurs in a line
    /// claims it; unmatched lines are ignored.
    pub fn parse(stdout: &str, rules: &[ReportRule]) -> Self {
        let mut observations = Vec::new();

        for (line_num, line) in stdout.lines().enumerate() {
            let Some(rule) = rules.iter().find(|rule| line.contains(rule.label.as_str())) else {
                continue;
            };

            let field = line.split_whitespace().nth(rule.field);
            match field.map(str::parse::<f64>) {
                Some(Ok(value)) => observations.push(Observation {
                    component: rule.component.clone(),
                    value,
                }),
                _ => warn!(
                    line = line_num + 1,
                    component = %rule.component,
                    "Report line matched but field {} is not a number: '{}'",
                    rule.field,
                    line.trim()
                ),
            }
        }

        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn values_of<'a>(&'a self, component: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.observations
            .iter()
            .filter(move |obs| obs.component == component)
            .map(|obs| obs.value)
    }
}
