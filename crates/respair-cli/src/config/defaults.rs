use respair::engine::config::{
    DEFAULT_ANALYZE_COMMAND, DEFAULT_ARCHIVE_COMMAND, DEFAULT_EXTRACTION_MODE,
    DEFAULT_FRAME_STRIDE,
};
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub archive_command: String,
    pub analyze_command: String,
    pub extraction_mode: u32,
    pub frame_stride: usize,
    pub scratch_dir: PathBuf,
    pub results_path: PathBuf,
    pub reference_pair: bool,
    pub reference_first_serial: usize,
    pub reference_partner_first_serial: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            archive_command: DEFAULT_ARCHIVE_COMMAND.to_string(),
            analyze_command: DEFAULT_ANALYZE_COMMAND.to_string(),
            extraction_mode: DEFAULT_EXTRACTION_MODE,
            frame_stride: DEFAULT_FRAME_STRIDE,
            scratch_dir: PathBuf::from("respair-scratch"),
            results_path: PathBuf::from("energy_analysis.txt"),
            reference_pair: true,
            reference_first_serial: 1,
            reference_partner_first_serial: 17,
        }
    }
}
