use std::time::Duration;

use serde::Serialize;

use crate::error::PreloadError;
use crate::location::Location;

/// Description of a failed preload that did not propagate as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadFailure {
    pub message: String,
    pub code: u16,
}

impl From<&PreloadError> for PreloadFailure {
    fn from(err: &PreloadError) -> Self {
        Self {
            message: err.to_string(),
            code: err.error_code().as_u16(),
        }
    }
}

/// What a navigation settled to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Preloading finished (or there was nothing to preload).
    Proceed {
        location: Location,
        #[serde(skip_serializing_if = "Option::is_none", with = "opt_millis")]
        elapsed: Option<Duration>,
    },
    Redirect { location: Location },
    /// Client-side failure, already logged and reported.
    Failed(PreloadFailure),
    /// Superseded or cancelled; no status event was emitted for the result.
    Cancelled,
}

impl Outcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn redirect_location(&self) -> Option<&Location> {
        match self {
            Self::Redirect { location } => Some(location),
            _ => None,
        }
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_u64(d.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }
}
