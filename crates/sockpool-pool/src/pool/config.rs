//! Pool configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sockpool_core::{PoolError, PoolResult};

/// Configuration for a connection pool
///
/// Controls pool sizing and the default acquisition bound. Bounds are
/// checked by [`PoolConfig::validate`], which every pool constructor calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of connections created eagerly at construction
    min_size: usize,
    /// Maximum number of live connections
    max_size: usize,
    /// Default timeout in milliseconds for `get_with_default_timeout`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    acquire_timeout_ms: Option<u64>,
}

impl PoolConfig {
    /// Create a new pool configuration with the given min and max sizes
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self {
            min_size,
            max_size,
            acquire_timeout_ms: None,
        }
    }

    /// Parse a configuration from TOML and validate it
    pub fn from_toml_str(source: &str) -> PoolResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| PoolError::Config(format!("invalid pool config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the default acquire timeout in milliseconds
    #[must_use]
    pub fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = Some(timeout_ms);
        self
    }

    /// Check the pool bounds
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Config` if `max_size` is 0 or `min_size > max_size`.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_size == 0 {
            return Err(PoolError::Config(
                "max_size must be greater than 0".into(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(PoolError::Config(format!(
                "min_size ({}) cannot exceed max_size ({})",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get the default acquire timeout as a Duration if set
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for PoolConfig {
    /// Defaults: min_size 1, max_size 10, no acquire timeout
    fn default() -> Self {
        Self::new(1, 10)
    }
}
