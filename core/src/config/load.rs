use std::path::Path;

use crate::error::ConfigError;
use crate::executor::BatchFailurePolicy;

use super::types::{PreloadConfig, QueryScope};

/// Load configuration.
///
/// Priority: `$PRELOAD_CONFIG`, then `./preload.toml`, then defaults.
/// Environment overrides are applied on top in every case.
pub fn load_default() -> Result<PreloadConfig, ConfigError> {
    let explicit = std::env::var("PRELOAD_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let local = Path::new("preload.toml");

    let mut cfg = match explicit {
        Some(path) => load_from_path(Path::new(&path))?,
        None if local.exists() => load_from_path(local)?,
        None => PreloadConfig::default(),
    };

    apply_env_overrides(&mut cfg)?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> Result<PreloadConfig, ConfigError> {
    let display = path.display().to_string();
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    toml::from_str::<PreloadConfig>(&s).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

pub fn apply_env_overrides(cfg: &mut PreloadConfig) -> Result<(), ConfigError> {
    apply_env_overrides_with(cfg, |key| std::env::var(key).ok())
}

/// Same as [`apply_env_overrides`] with an injectable variable lookup.
pub fn apply_env_overrides_with<F>(cfg: &mut PreloadConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PRELOAD_LOG_LEVEL") {
        cfg.logging.level = v;
    }

    if let Some(v) = get("PRELOAD_SKIP_UNCHANGED") {
        cfg.preload.skip_unchanged = match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "PRELOAD_SKIP_UNCHANGED",
                    value: v,
                })
            }
        };
    }

    if let Some(v) = get("PRELOAD_BATCH_FAILURE") {
        cfg.preload.batch_failure = match v.trim() {
            "detach" => BatchFailurePolicy::Detach,
            "cancel-siblings" => BatchFailurePolicy::CancelSiblings,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "PRELOAD_BATCH_FAILURE",
                    value: v,
                })
            }
        };
    }

    if let Some(v) = get("PRELOAD_QUERY_SCOPE") {
        cfg.preload.query_scope = match v.trim() {
            "innermost" => QueryScope::Innermost,
            "all" => QueryScope::All,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "PRELOAD_QUERY_SCOPE",
                    value: v,
                })
            }
        };
    }

    if let Some(v) = get("PRELOAD_MAX_REDIRECTS") {
        cfg.preload.max_redirects = v.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "PRELOAD_MAX_REDIRECTS",
            value: v.clone(),
        })?;
    }

    Ok(())
}
