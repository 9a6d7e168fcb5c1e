mod load;
mod types;

pub use load::{apply_env_overrides, apply_env_overrides_with, load_default, load_from_path};
pub use types::{LoggingConfig, PreloadConfig, PreloadSettings, QueryScope};
