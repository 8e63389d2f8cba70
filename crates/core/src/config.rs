//! Process-wide observatory configuration.
//!
//! Mirrors `original_source/config.py`'s `CONFIG` singleton, but as an
//! explicit value: constructed once by the CLI entry point and threaded
//! through as `Arc<ObservatoryConfig>` rather than read from a module-level
//! global. [`ObservatoryConfig::initialize`] preserves the original's
//! "already initialized is a hard error" behavior for callers that do want
//! process-wide access.

use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// A device's host/port address on the instrument daemon's network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonAddress {
    pub host: String,
    pub port: u16,
}

impl Default for DaemonAddress {
    fn default() -> Self {
        Self { host: "localhost".into(), port: 7624 }
    }
}

/// Mount, camera, focuser, filter-wheel device names, daemon address, and
/// catalog URL — the full set of process-wide settings (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservatoryConfig {
    pub mount: String,
    pub camera: String,
    pub focus: String,
    pub wheel: String,
    pub host: DaemonAddress,
    pub cache_url: String,
}

impl Default for ObservatoryConfig {
    /// Matches `original_source/config.py`'s `_DEFAULT_SETTINGS`.
    fn default() -> Self {
        Self {
            mount: "iOptron CEM70".into(),
            camera: "ZWO CCD ASI533MM Pro".into(),
            focus: "ZWO EAF".into(),
            wheel: "ZWO EFW".into(),
            host: DaemonAddress::default(),
            cache_url: "http://127.0.0.1:8090".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ObservatoryConfig is already initialized")]
    AlreadyInitialized,
}

static CONFIG: OnceLock<Arc<ObservatoryConfig>> = OnceLock::new();

impl ObservatoryConfig {
    /// Initialize the process-wide config. Returns an error if already set.
    pub fn initialize(config: ObservatoryConfig) -> Result<Arc<ObservatoryConfig>, ConfigError> {
        let config = Arc::new(config);
        CONFIG.set(config.clone()).map_err(|_| ConfigError::AlreadyInitialized)?;
        Ok(config)
    }

    /// Returns the process-wide config, if initialized.
    pub fn get() -> Option<Arc<ObservatoryConfig>> {
        CONFIG.get().cloned()
    }

    /// Devices named in this config, for the startup "unconfigured device"
    /// warning check (spec §4.4, supplemented).
    pub fn configured_devices(&self) -> [&str; 4] {
        [self.mount.as_str(), self.camera.as_str(), self.focus.as_str(), self.wheel.as_str()]
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
