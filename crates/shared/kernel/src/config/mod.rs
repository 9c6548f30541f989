use crate::error::{KernelError, KernelErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable prefix for overrides (`HOTBAR__TICK__RATE_HZ=40`).
pub const ENV_PREFIX: &str = "HOTBAR";
const DEFAULT_CONFIG_FILE: &str = "hotbar";

/// Loads a configuration structure from a file layered with environment overrides.
///
/// 1. **Base file**: `path`, or `hotbar` (any format the `config` crate recognises by extension,
///    e.g. `hotbar.toml`) in the current directory.
/// 2. **Environment**: variables prefixed with `HOTBAR__`; nested keys are separated by `__`
///    (`HOTBAR__MODULES__FAILURE_POLICY=rollback` maps to `modules.failure_policy`).
///
/// # Errors
/// Returns [`KernelError::Config`] if the file is missing or the merged values do not match `T`.
///
/// # Example
/// ```rust
/// use hotbar_kernel::config::load_config;
/// use hotbar_domain::config::HostConfig;
///
/// let cfg: HostConfig = load_config(Some("config/local")).unwrap_or_default();
/// assert_eq!(cfg.tick.rate_hz, 20);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, KernelError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
