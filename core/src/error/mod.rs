pub mod cli;
pub mod config;
pub mod preload;

pub use cli::CliError;
pub use config::ConfigError;
pub use preload::{ErrorCode, PreloadError};
