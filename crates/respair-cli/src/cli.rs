use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "ResPair Developers",
    version,
    about = "ResPair CLI - Pairwise residue interaction energies from Tinker archive trajectories, evaluated through external extraction and energy-analysis programs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute interaction energy statistics for every residue pair of one or more trajectories.
    Run(RunArgs),
    /// Print the residue segmentation of a trajectory without running any external tool.
    Residues(ResiduesArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Core Arguments ---
    /// Trajectory files in Tinker archive format. Processed one after another.
    #[arg(short, long = "trajectory", required = true, num_args(1..), value_name = "PATH")]
    pub trajectories: Vec<PathBuf>,

    /// Force-field parameter file handed to the energy-analysis program.
    #[arg(short, long, value_name = "PATH")]
    pub parameters: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Output Overrides ---
    /// Results file the per-pair blocks are appended to.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write a CSV summary of every pair and component.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    // --- Tool Overrides ---
    /// Program used to extract pair structures from the trajectory.
    #[arg(long, value_name = "PROGRAM")]
    pub archive_command: Option<String>,

    /// Program used to evaluate the energy decomposition of a pair structure.
    #[arg(long, value_name = "PROGRAM")]
    pub analyze_command: Option<String>,

    /// Kill an external program that runs longer than this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    // --- Extraction Overrides ---
    /// Extraction mode code passed to the extraction program.
    #[arg(short, long, value_name = "INT")]
    pub mode: Option<u32>,

    /// Stride over the trajectory frames.
    #[arg(long, value_name = "INT")]
    pub stride: Option<usize>,

    /// Directory the extraction program writes into. Defaults to the trajectory's directory.
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Directory for the renamed per-pair structure files.
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Keep the per-pair structure files instead of deleting them after analysis.
    #[arg(long)]
    pub keep_artifacts: bool,

    /// Never treat a pair as the two-residue reference system.
    #[arg(long)]
    pub no_reference_pair: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S extraction.frame-stride=2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `residues` subcommand.
#[derive(Args, Debug)]
pub struct ResiduesArgs {
    /// Trajectory file in Tinker archive format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_several_trajectories() {
        let cli = Cli::parse_from([
            "respair", "-vv", "run", "-t", "a.arc", "b.arc", "-p", "ff.prm",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(
                    args.trajectories,
                    vec![PathBuf::from("a.arc"), PathBuf::from("b.arc")]
                );
                assert_eq!(args.parameters, Some(PathBuf::from("ff.prm")));
                assert!(!args.keep_artifacts);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["respair", "-q", "-v", "residues", "-t", "a.arc"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_requires_a_trajectory() {
        let result = Cli::try_parse_from(["respair", "run", "-p", "ff.prm"]);
        assert!(result.is_err());
    }
}
