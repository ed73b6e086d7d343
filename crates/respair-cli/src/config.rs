mod defaults;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use respair::core::energy::report::ReportRule;
use respair::core::selection::ReferenceGeometry;
use respair::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialToolsConfig {
    #[serde(rename = "archive-command")]
    archive_command: Option<String>,
    #[serde(rename = "analyze-command")]
    analyze_command: Option<String>,
    #[serde(rename = "timeout-secs")]
    timeout_secs: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialExtractionConfig {
    mode: Option<u32>,
    #[serde(rename = "frame-stride")]
    frame_stride: Option<usize>,
    #[serde(rename = "artifact-dir")]
    artifact_dir: Option<PathBuf>,
    #[serde(rename = "scratch-dir")]
    scratch_dir: Option<PathBuf>,
    #[serde(rename = "keep-artifacts")]
    keep_artifacts: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSelectionConfig {
    #[serde(rename = "reference-pair")]
    reference_pair: Option<bool>,
    #[serde(rename = "first-serial")]
    first_serial: Option<usize>,
    #[serde(rename = "partner-first-serial")]
    partner_first_serial: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAnalysisConfig {
    #[serde(rename = "parameter-file")]
    parameter_file: Option<PathBuf>,
    rules: Option<Vec<ReportRule>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    results: Option<PathBuf>,
    csv: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    tools: Option<PartialToolsConfig>,
    extraction: Option<PartialExtractionConfig>,
    selection: Option<PartialSelectionConfig>,
    analysis: Option<PartialAnalysisConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<core_config::PairEnergyConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let tools = self.tools.take().unwrap_or_default();
        let extraction = self.extraction.take().unwrap_or_default();
        let selection = self.selection.take().unwrap_or_default();
        let analysis = self.analysis.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let parameter_file = args
            .parameters
            .clone()
            .or(analysis.parameter_file)
            .ok_or_else(|| {
                CliError::Config(
                    "A force-field parameter file is required either in the config file \
                     (`analysis.parameter-file`) or via --parameters."
                        .to_string(),
                )
            })?;
        if !parameter_file.exists() {
            return Err(CliError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Parameter file does not exist: {}", parameter_file.display()),
            )));
        }

        let timeout = args
            .timeout
            .or(tools.timeout_secs)
            .map(Self::parse_timeout)
            .transpose()?;

        let reference_geometry = Self::merge_reference_geometry(
            args.no_reference_pair,
            selection,
            &defaults,
        );

        let mut builder = core_config::PairEnergyConfigBuilder::new()
            .archive_command(
                args.archive_command
                    .clone()
                    .or(tools.archive_command)
                    .unwrap_or(defaults.archive_command),
            )
            .analyze_command(
                args.analyze_command
                    .clone()
                    .or(tools.analyze_command)
                    .unwrap_or(defaults.analyze_command),
            )
            .timeout(timeout)
            .extraction_mode(
                args.mode
                    .or(extraction.mode)
                    .unwrap_or(defaults.extraction_mode),
            )
            .frame_stride(
                args.stride
                    .or(extraction.frame_stride)
                    .unwrap_or(defaults.frame_stride),
            )
            .reference_geometry(reference_geometry)
            .artifact_dir(args.artifact_dir.clone().or(extraction.artifact_dir))
            .scratch_dir(
                args.scratch_dir
                    .clone()
                    .or(extraction.scratch_dir)
                    .unwrap_or(defaults.scratch_dir),
            )
            .keep_artifacts(args.keep_artifacts || extraction.keep_artifacts.unwrap_or(false))
            .parameter_file(parameter_file)
            .results_path(
                args.output
                    .clone()
                    .or(output.results)
                    .unwrap_or(defaults.results_path),
            )
            .csv_summary_path(args.csv.clone().or(output.csv));

        if let Some(rules) = analysis.rules {
            builder = builder.report_rules(rules);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn parse_timeout(seconds: f64) -> Result<Duration> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(CliError::Config(format!(
                "Timeout must be a positive number of seconds, got {}",
                seconds
            )));
        }
        Duration::try_from_secs_f64(seconds).map_err(|e| {
            CliError::Config(format!("Timeout of {} seconds is out of range: {}", seconds, e))
        })
    }

    fn merge_reference_geometry(
        cli_no_reference_pair: bool,
        partial: PartialSelectionConfig,
        defaults: &DefaultsConfig,
    ) -> Option<ReferenceGeometry> {
        let enabled = !cli_no_reference_pair
            && partial.reference_pair.unwrap_or(defaults.reference_pair);
        enabled.then(|| ReferenceGeometry {
            first_serial: partial
                .first_serial
                .unwrap_or(defaults.reference_first_serial),
            partner_first_serial: partial
                .partner_first_serial
                .unwrap_or(defaults.reference_partner_first_serial),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "tools.archive-command" => {
                    self.tools.get_or_insert_with(Default::default).archive_command =
                        Some(value_str.to_string());
                }
                "tools.analyze-command" => {
                    self.tools.get_or_insert_with(Default::default).analyze_command =
                        Some(value_str.to_string());
                }
                "tools.timeout-secs" => {
                    self.tools.get_or_insert_with(Default::default).timeout_secs =
                        Some(parse_value(key, value_str, "float")?);
                }
                "extraction.mode" => {
                    self.extraction.get_or_insert_with(Default::default).mode =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "extraction.frame-stride" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .frame_stride = Some(parse_value(key, value_str, "integer")?);
                }
                "extraction.artifact-dir" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .artifact_dir = Some(PathBuf::from(value_str));
                }
                "extraction.scratch-dir" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .scratch_dir = Some(PathBuf::from(value_str));
                }
                "extraction.keep-artifacts" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .keep_artifacts = Some(parse_value(key, value_str, "boolean")?);
                }
                "selection.reference-pair" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .reference_pair = Some(parse_value(key, value_str, "boolean")?);
                }
                "selection.first-serial" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .first_serial = Some(parse_value(key, value_str, "integer")?);
                }
                "selection.partner-first-serial" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .partner_first_serial = Some(parse_value(key, value_str, "integer")?);
                }
                "analysis.parameter-file" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .parameter_file = Some(PathBuf::from(value_str));
                }
                "output.results" => {
                    self.output.get_or_insert_with(Default::default).results =
                        Some(PathBuf::from(value_str));
                }
                "output.csv" => {
                    self.output.get_or_insert_with(Default::default).csv =
                        Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}
