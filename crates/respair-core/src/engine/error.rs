use crate::core::io::arc::ArcError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Trajectory error: {0}")]
    Trajectory(#[from] ArcError),

    #[error("External tool '{tool}' was not found on the execution path")]
    ToolNotFound { tool: String },

    #[error("External tool '{tool}' could not be run: {source}")]
    ToolIo {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("External tool '{tool}' timed out after {seconds:.1}s")]
    ToolTimedOut { tool: String, seconds: f64 },

    #[error("No new structure file appeared in '{}'", dir.display())]
    ArtifactNotFound { dir: PathBuf },

    #[error("Residue {index} has no atoms")]
    EmptyResidue { index: usize },

    #[error("Failed to write results to '{}': {source}", path.display())]
    Results {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write CSV summary: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
