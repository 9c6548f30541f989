use crate::category::CategorySet;
use crate::constants::DEFAULT_TICK_RATE;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level host configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfigInner {
    pub tick: TickConfig,
    pub modules: ModulesConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(flatten, default)]
    inner: Arc<HostConfigInner>,
}

impl Deref for HostConfig {
    type Target = HostConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for HostConfig {
    fn deref_mut(&mut self) -> &mut HostConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Host loop timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub rate_hz: u32,
}

/// What happens to the stored flag when an enable/disable callback fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The flag keeps the attempted value.
    #[default]
    KeepAttempted,
    /// The flag is restored to its value before the toggle.
    Rollback,
}

/// Module registry behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    pub failure_policy: FailurePolicy,
    pub persist_enabled_categories: CategorySet,
}

/// Logging sinks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for TickConfig {
    fn default() -> Self {
        Self { rate_hz: DEFAULT_TICK_RATE }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            persist_enabled_categories: CategorySet::PERSISTED,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false }
    }
}
