//! Configuration for slotstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration for a store instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Backing file. `None` disables persistence entirely: save and load
    /// become no-ops and no autosave thread is started.
    pub path: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // Autosave Configuration
    // -------------------------------------------------------------------------
    /// Periodically flush modified state, plus once more on shutdown
    pub autosave: bool,

    /// Tick interval of the autosave thread
    #[serde(with = "duration_millis")]
    pub autosave_interval: Duration,

    // -------------------------------------------------------------------------
    // Request Configuration
    // -------------------------------------------------------------------------
    /// Upper bound on how long a caller waits for a reply from the actor
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            autosave: true,
            autosave_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// True when the autosave thread should run for this config
    pub fn autosave_enabled(&self) -> bool {
        self.autosave && self.path.is_some()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    /// Enable or disable autosave
    pub fn autosave(mut self, enabled: bool) -> Self {
        self.config.autosave = enabled;
        self
    }

    /// Set the autosave tick interval
    pub fn autosave_interval(mut self, interval: Duration) -> Self {
        self.config.autosave_interval = interval;
        self
    }

    /// Set the reply timeout for blocking requests
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
