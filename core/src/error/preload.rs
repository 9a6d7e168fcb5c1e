use thiserror::Error;

use crate::location::Location;

/// Stable numeric codes carried by `preload.failed` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    GeneralError = 1,
    TaskRejected = 10,
    RoutingError = 11,
    ConfigurationError = 20,
    HandlerContractViolation = 21,
    Redirect = 30,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Everything a preload pass can settle with other than success.
///
/// `Redirect` is control flow rather than a failure: it is produced by the
/// preload dispatcher on the server and is never reported through the
/// `preload.failed` path.
#[derive(Error, Debug)]
pub enum PreloadError {
    #[error("redirect to {0}")]
    Redirect(Location),

    #[error("load task of '{component}' rejected: {source}")]
    TaskRejected {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("load task of '{component}' is misconfigured: {reason}")]
    Configuration { component: String, reason: String },

    #[error("error handler for '{path}' neither redirected nor rethrew during server-side preload")]
    HandlerContractViolation { path: String },

    #[error("route matching failed: {0}")]
    Routing(#[source] anyhow::Error),
}

impl PreloadError {
    pub fn rejected<E>(component: impl Into<String>, err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::TaskRejected {
            component: component.into(),
            source: err.into(),
        }
    }

    pub fn configuration(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            reason: reason.into(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    pub fn redirect_location(&self) -> Option<&Location> {
        match self {
            Self::Redirect(location) => Some(location),
            _ => None,
        }
    }

    /// Fill in the owning component for errors raised without one.
    pub fn attributed_to(self, owner: &str) -> Self {
        match self {
            Self::TaskRejected { component, source } if component.is_empty() => {
                Self::TaskRejected {
                    component: owner.to_string(),
                    source,
                }
            }
            Self::Configuration { component, reason } if component.is_empty() => {
                Self::Configuration {
                    component: owner.to_string(),
                    reason,
                }
            }
            other => other,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Redirect(_) => ErrorCode::Redirect,
            Self::TaskRejected { .. } => ErrorCode::TaskRejected,
            Self::Configuration { .. } => ErrorCode::ConfigurationError,
            Self::HandlerContractViolation { .. } => ErrorCode::HandlerContractViolation,
            Self::Routing(_) => ErrorCode::RoutingError,
        }
    }
}

/// Lets load tasks use `?` on anything `anyhow` accepts; the descriptor
/// attributes the rejection to its component afterwards.
impl From<anyhow::Error> for PreloadError {
    fn from(err: anyhow::Error) -> Self {
        Self::TaskRejected {
            component: String::new(),
            source: err,
        }
    }
}
