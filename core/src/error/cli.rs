use thiserror::Error;

use super::{ConfigError, PreloadError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid plan {path}: {reason}")]
    Plan { path: String, reason: String },
    #[error("navigation failed: {0}")]
    Navigation(#[from] PreloadError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    pub fn plan(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Plan {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code.
    ///
    /// Navigation failures reuse their [`ErrorCode`](super::ErrorCode); the
    /// rest follow the usual config (11), io (20), internal (50) split.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Plan { .. } => 11,
            Self::Navigation(err) => i32::from(err.error_code().as_u16()),
            Self::Command(_) | Self::Io(_) => 20,
            Self::Anyhow(_) => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::plan("plan.toml", "no routes").exit_code(), 11);
        assert_eq!(
            CliError::from(PreloadError::Redirect(Location::new("/login"))).exit_code(),
            30
        );
        assert_eq!(CliError::Command("boom".into()).exit_code(), 20);
    }
}
