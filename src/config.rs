use std::time::Duration;

use serde::Deserialize;

/// Buffering and timeout settings shared by the sync and async decoders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Bytes requested from the reader per refill.
    pub buffer_size: usize,
    /// Upper bound on buffered bytes. Each array element, and each field name
    /// or scalar read on the way down the path, must fit. Whitespace and the
    /// strings of skipped siblings are released as they are scanned.
    pub max_buffer_size: usize,
    /// Per-read timeout in milliseconds. Only the async decoder honors it.
    pub timeout_ms: Option<u64>,
}

impl SliceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8 * 1024,
            max_buffer_size: 16 * 1024 * 1024,
            timeout_ms: None,
        }
    }
}

#[cfg(feature = "configs")]
pub mod configuration {
    use config::Config;

    use super::SliceConfig;

    /// Loads a [`SliceConfig`] from a file (any format the `config` crate
    /// understands), overlaid with `JSONSLICE_*` environment variables.
    pub fn load_config(path: &str) -> Result<SliceConfig, config::ConfigError> {
        let settings = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("JSONSLICE"))
            .build()?;

        settings.try_deserialize()
    }
}
