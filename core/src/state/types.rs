use serde::{Deserialize, Serialize};

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Matching the route or executing the chain.
    Pending,
    Finished,
    Failed,
    /// Superseded by a newer navigation or cancelled explicitly.
    Cancelled,
    /// The navigation resolved to a different location.
    Redirected,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Redirected => "redirected",
        }
    }
}
