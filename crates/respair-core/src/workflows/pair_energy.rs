use crate::core::energy::report::EnergyReport;
use crate::core::energy::statistics::EnergyAggregator;
use crate::core::io::arc::{ArcFile, Trajectory};
use crate::core::io::results::{append_pair_block, write_csv_summary};
use crate::core::models::pair::{ResiduePair, enumerate_pairs, pair_count};
use crate::core::models::residue::{Residue, segment_residues};
use crate::core::selection::{AtomSelection, ExtractionScript, FrameRange};
use crate::engine::analysis::analyze_pair;
use crate::engine::config::PairEnergyConfig;
use crate::engine::error::EngineError;
use crate::engine::extraction::extract_pair;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tool::ExternalTool;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A pair that produced no statistics, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPair {
    pub pair: ResiduePair,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct PairEnergyResult {
    pub trajectory: PathBuf,
    pub frame_count: usize,
    pub residue_count: usize,
    pub aggregator: EnergyAggregator,
    pub completed: Vec<ResiduePair>,
    pub skipped: Vec<SkippedPair>,
}

/// Outcome of one trajectory file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<PairEnergyResult, EngineError>,
}

/// Runs the pairwise pipeline over one loaded trajectory.
///
/// Pairs are processed strictly in enumeration order. A pair whose extraction or
/// analysis fails, or whose report carries no recognised energy lines, is recorded in
/// [`PairEnergyResult::skipped`] and the run moves on. Every completed pair appends
/// its block to the results file immediately.
#[instrument(
    skip_all,
    name = "pair_energy_workflow",
    fields(trajectory = %trajectory.path.display())
)]
pub fn run(
    trajectory: &Trajectory,
    config: &PairEnergyConfig,
    tool: &dyn ExternalTool,
    reporter: &ProgressReporter,
) -> Result<PairEnergyResult, EngineError> {
    // === Phase 1: Residue segmentation ===
    reporter.report(Progress::PhaseStart {
        name: "Segmentation".to_string(),
    });
    let residues = segment_residues(trajectory.atoms.iter().cloned());
    info!(
        "Segmented {} atoms into {} residues across {} frame(s).",
        trajectory.atoms.len(),
        residues.len(),
        trajectory.header.frame_count
    );
    reporter.report(Progress::PhaseFinish);

    fs::create_dir_all(&config.extraction.scratch_dir)?;

    let mut result = PairEnergyResult {
        trajectory: trajectory.path.clone(),
        frame_count: trajectory.header.frame_count,
        residue_count: residues.len(),
        aggregator: EnergyAggregator::new(),
        completed: Vec::new(),
        skipped: Vec::new(),
    };

    // === Phase 2: Pairwise extraction and energy analysis ===
    let total = pair_count(residues.len());
    reporter.report(Progress::PhaseStart {
        name: "Pair Energies".to_string(),
    });
    reporter.report(Progress::TaskStart { total: total as u64 });

    for pair in enumerate_pairs(residues.len()) {
        reporter.report(Progress::StatusUpdate {
            text: pair.to_string(),
        });

        match evaluate_pair(trajectory, &residues, pair, config, tool) {
            Ok(report) if report.is_empty() => {
                warn!("{}: no energy observations, skipping.", pair);
                reporter.report(Progress::PairSkipped { pair });
                result.skipped.push(SkippedPair {
                    pair,
                    reason: "energy report contained no recognised lines".to_string(),
                });
            }
            Ok(report) => {
                result.aggregator.record_report(pair, &report);
                let summary = result.aggregator.summary(pair);
                let results_path = &config.output.results_path;
                append_pair_block(results_path, pair, &summary).map_err(|source| {
                    EngineError::Results {
                        path: results_path.clone(),
                        source,
                    }
                })?;
                result.completed.push(pair);
            }
            Err(e) => {
                warn!("{}: skipped: {}", pair, e);
                reporter.report(Progress::PairSkipped { pair });
                result.skipped.push(SkippedPair {
                    pair,
                    reason: e.to_string(),
                });
            }
        }

        reporter.report(Progress::TaskIncrement { amount: 1 });
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        "Pair energy workflow complete: {} pair(s) evaluated, {} skipped.",
        result.completed.len(),
        result.skipped.len()
    );
    Ok(result)
}

/// Runs the pipeline over every trajectory in `paths`, one after another.
///
/// A file that cannot be read is reported in its [`FileOutcome`] and the batch
/// continues with the next file. When a CSV summary path is configured it is written
/// once, after the last file, from every successful run.
#[instrument(skip_all, name = "pair_energy_batch", fields(files = paths.len()))]
pub fn run_files(
    paths: &[PathBuf],
    config: &PairEnergyConfig,
    tool: &dyn ExternalTool,
    reporter: &ProgressReporter,
) -> Vec<FileOutcome> {
    let mut outcomes = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        reporter.report(Progress::FileStart {
            index,
            total: paths.len(),
            path: path.clone(),
        });
        let result = ArcFile::read_from_path(path)
            .map_err(EngineError::from)
            .and_then(|trajectory| run(&trajectory, config, tool, reporter));

        if let Err(e) = &result {
            warn!("Skipping '{}': {}", path.display(), e);
        }
        reporter.report(Progress::FileFinish {
            succeeded: result.is_ok(),
        });
        outcomes.push(FileOutcome {
            path: path.clone(),
            result,
        });
    }

    if let Some(csv_path) = &config.output.csv_summary_path {
        let runs = outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|run| (run.trajectory.as_path(), &run.aggregator));
        match write_csv_summary(csv_path, runs).map_err(EngineError::from) {
            Ok(()) => info!("CSV summary written to '{}'.", csv_path.display()),
            Err(e) => warn!("'{}': {}", csv_path.display(), e),
        }
    }

    outcomes
}

fn evaluate_pair(
    trajectory: &Trajectory,
    residues: &[Residue],
    pair: ResiduePair,
    config: &PairEnergyConfig,
    tool: &dyn ExternalTool,
) -> Result<EnergyReport, EngineError> {
    let span_of = |index: usize| {
        residues[index]
            .span()
            .ok_or(EngineError::EmptyResidue { index })
    };
    let first = span_of(pair.first)?;
    let second = span_of(pair.second)?;

    let selection =
        AtomSelection::for_pair(first, second, config.extraction.reference_geometry.as_ref());
    debug!("{} classified as {:?}", pair, selection.rule);

    let script = ExtractionScript::new(
        &trajectory.path,
        config.extraction.mode,
        selection,
        &trajectory.header.text,
        FrameRange::all(trajectory.header.frame_count, config.extraction.frame_stride),
    );
    let artifact = extract_pair(tool, config, &script, pair)?;

    let report = analyze_pair(
        tool,
        &config.tools.analyze_command,
        &artifact,
        &config.analysis.parameter_file,
        &config.analysis.report_rules,
    );

    if !config.extraction.keep_artifacts {
        remove_artifact(&artifact);
    }
    report
}

fn remove_artifact(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove temporary artifact '{}': {}", path.display(), e);
    }
}
