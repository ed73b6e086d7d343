use crate::core::models::pair::ResiduePair;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Progress {
    /// A trajectory of a batch is about to be read. `index` counts from zero.
    FileStart {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    FileFinish { succeeded: bool },

    PhaseStart { name: String },
    PhaseFinish,

    TaskStart { total: u64 },
    TaskIncrement { amount: u64 },
    TaskFinish,

    StatusUpdate { text: String },
    PairSkipped { pair: ResiduePair },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
