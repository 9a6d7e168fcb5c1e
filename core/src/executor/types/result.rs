use std::time::Duration;

use crate::error::PreloadError;

/// Settlement of one chain execution.
#[derive(Debug)]
pub enum ChainResult {
    /// Every stage succeeded and the session was not cancelled.
    Finished { elapsed: Duration },

    /// A stage rejected; later stages never started.
    Failed(PreloadError),

    /// The session was cancelled; the eventual result of in-flight tasks is ignored.
    Cancelled,
}

impl ChainResult {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
