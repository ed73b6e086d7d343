use crate::core::energy::report::{ReportRule, default_rules};
use crate::core::selection::ReferenceGeometry;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ARCHIVE_COMMAND: &str = "archive";
pub const DEFAULT_ANALYZE_COMMAND: &str = "analyze";
pub const DEFAULT_EXTRACTION_MODE: u32 = 3;
pub const DEFAULT_FRAME_STRIDE: usize = 1;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub archive_command: String,
    pub analyze_command: String,
    /// Upper bound on a single tool invocation. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub mode: u32,
    pub frame_stride: usize,
    pub reference_geometry: Option<ReferenceGeometry>,
    /// Directory the extraction tool writes into. Defaults to the trajectory's directory.
    pub artifact_dir: Option<PathBuf>,
    /// Directory holding the renamed `pair_<i>_<j>.arc` artifacts.
    pub scratch_dir: PathBuf,
    pub keep_artifacts: bool,
    /// Files written during extraction that must never be taken for the artifact,
    /// such as a log file inside the artifact directory.
    pub ignored_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub parameter_file: PathBuf,
    pub report_rules: Vec<ReportRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub results_path: PathBuf,
    pub csv_summary_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairEnergyConfig {
    pub tools: ToolConfig,
    pub extraction: ExtractionConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Default)]
pub struct PairEnergyConfigBuilder {
    archive_command: Option<String>,
    analyze_command: Option<String>,
    timeout: Option<Duration>,
    extraction_mode: Option<u32>,
    frame_stride: Option<usize>,
    reference_geometry: Option<Option<ReferenceGeometry>>,
    artifact_dir: Option<PathBuf>,
    scratch_dir: Option<PathBuf>,
    keep_artifacts: bool,
    ignored_paths: Vec<PathBuf>,
    parameter_file: Option<PathBuf>,
    report_rules: Option<Vec<ReportRule>>,
    results_path: Option<PathBuf>,
    csv_summary_path: Option<PathBuf>,
}

impl PairEnergyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn archive_command(mut self, command: impl Into<String>) -> Self {
        self.archive_command = Some(command.into());
        self
    }
    pub fn analyze_command(mut self, command: impl Into<String>) -> Self {
        self.analyze_command = Some(command.into());
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn extraction_mode(mut self, mode: u32) -> Self {
        self.extraction_mode = Some(mode);
        self
    }
    pub fn frame_stride(mut self, stride: usize) -> Self {
        self.frame_stride = Some(stride);
        self
    }
    pub fn reference_geometry(mut self, geometry: Option<ReferenceGeometry>) -> Self {
        self.reference_geometry = Some(geometry);
        self
    }
    pub fn artifact_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.artifact_dir = dir;
        self
    }
    pub fn scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }
    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }
    pub fn ignore_path(mut self, path: PathBuf) -> Self {
        self.ignored_paths.push(path);
        self
    }
    pub fn parameter_file(mut self, path: PathBuf) -> Self {
        self.parameter_file = Some(path);
        self
    }
    pub fn report_rules(mut self, rules: Vec<ReportRule>) -> Self {
        self.report_rules = Some(rules);
        self
    }
    pub fn results_path(mut self, path: PathBuf) -> Self {
        self.results_path = Some(path);
        self
    }
    pub fn csv_summary_path(mut self, path: Option<PathBuf>) -> Self {
        self.csv_summary_path = path;
        self
    }

    pub fn build(self) -> Result<PairEnergyConfig, ConfigError> {
        let frame_stride = self.frame_stride.unwrap_or(DEFAULT_FRAME_STRIDE);
        if frame_stride == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "frame_stride",
                reason: "must be at least 1".to_string(),
            });
        }

        let report_rules = self.report_rules.unwrap_or_else(default_rules);
        if report_rules.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "report_rules",
                reason: "at least one rule is required".to_string(),
            });
        }
        if let Some(rule) = report_rules.iter().find(|rule| rule.label.is_empty()) {
            return Err(ConfigError::InvalidParameter {
                name: "report_rules",
                reason: format!("rule for component '{}' has an empty label", rule.component),
            });
        }

        let tools = ToolConfig {
            archive_command: self
                .archive_command
                .unwrap_or_else(|| DEFAULT_ARCHIVE_COMMAND.to_string()),
            analyze_command: self
                .analyze_command
                .unwrap_or_else(|| DEFAULT_ANALYZE_COMMAND.to_string()),
            timeout: self.timeout,
        };
        let extraction = ExtractionConfig {
            mode: self.extraction_mode.unwrap_or(DEFAULT_EXTRACTION_MODE),
            frame_stride,
            reference_geometry: self
                .reference_geometry
                .unwrap_or_else(|| Some(ReferenceGeometry::default())),
            artifact_dir: self.artifact_dir,
            scratch_dir: self.scratch_dir.unwrap_or_else(|| PathBuf::from(".")),
            keep_artifacts: self.keep_artifacts,
            ignored_paths: self.ignored_paths,
        };
        let analysis = AnalysisConfig {
            parameter_file: self
                .parameter_file
                .ok_or(ConfigError::MissingParameter("parameter_file"))?,
            report_rules,
        };
        let output = OutputConfig {
            results_path: self
                .results_path
                .ok_or(ConfigError::MissingParameter("results_path"))?,
            csv_summary_path: self.csv_summary_path,
        };

        Ok(PairEnergyConfig {
            tools,
            extraction,
            analysis,
            output,
        })
    }
}
