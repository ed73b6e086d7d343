use crate::cli::RunArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use respair::engine::progress::ProgressReporter;
use respair::engine::tool::ProcessTool;
use respair::workflows::pair_energy::{self, FileOutcome};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(
    args: RunArgs,
    log_file: Option<PathBuf>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let mut config = partial_config.merge_with_cli(&args)?;
    config.extraction.ignored_paths.extend(log_file);

    let tool = ProcessTool::new(config.tools.timeout);
    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting pairwise energy analysis of {} trajectory file(s)...",
        args.trajectories.len()
    );
    info!("Invoking the pair energy workflow...");

    let outcomes = tokio::task::block_in_place(|| {
        pair_energy::run_files(&args.trajectories, &config, &tool, &reporter)
    });

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    for outcome in &outcomes {
        println!("{}", describe_outcome(outcome));
    }
    println!(
        "Results appended to: {}",
        config.output.results_path.display()
    );
    if let Some(csv) = &config.output.csv_summary_path {
        if csv.exists() {
            println!("CSV summary written to: {}", csv.display());
        }
    }

    if succeeded == 0 {
        return Err(CliError::Other(anyhow::anyhow!(
            "None of the {} trajectory file(s) could be processed",
            outcomes.len()
        )));
    }
    if succeeded < outcomes.len() {
        warn!(
            "{} of {} trajectory file(s) failed.",
            outcomes.len() - succeeded,
            outcomes.len()
        );
    }
    Ok(())
}

fn describe_outcome(outcome: &FileOutcome) -> String {
    match &outcome.result {
        Ok(result) => {
            let mut line = format!(
                "✓ {}: {} residues, {} frame(s), {} pair(s) evaluated",
                outcome.path.display(),
                result.residue_count,
                result.frame_count,
                result.completed.len()
            );
            if !result.skipped.is_empty() {
                line.push_str(&format!(", {} skipped", result.skipped.len()));
                for skipped in &result.skipped {
                    line.push_str(&format!("\n    {}: {}", skipped.pair, skipped.reason));
                }
            }
            line
        }
        Err(e) => format!("✗ {}: {}", outcome.path.display(), e),
    }
}
