//! Error types for sockpool

use std::time::Duration;

use thiserror::Error;

/// Boxed error produced by connection factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by pool operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PoolError {
    /// Invalid pool bounds; no pool is produced
    #[error("Configuration error: {0}")]
    Config(String),

    /// The factory failed or the pool is at capacity
    #[error("Cannot create connection: {reason}")]
    Creation {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Connection pool has been closed")]
    Closed,

    #[error("Timed out waiting for connection (timeout: {0:?})")]
    Timeout(Duration),

    #[error("Cannot put a missing connection into the pool")]
    NilConnection,
}

impl PoolError {
    /// Creation refused because every slot is already taken
    pub fn at_capacity(total: usize, max_size: usize) -> Self {
        Self::Creation {
            reason: format!("at capacity ({total} of {max_size} connections live)"),
            source: None,
        }
    }

    /// Creation failed inside the connection factory
    pub fn factory(source: BoxError) -> Self {
        Self::Creation {
            reason: "connection factory failed".into(),
            source: Some(source),
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Timeouts and capacity refusals are transient; a closed pool,
    /// bad configuration or a factory failure are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Creation { source, .. } => source.is_none(),
            _ => false,
        }
    }
}

/// Result type alias for pool operations
pub type PoolResult<T> = std::result::Result<T, PoolError>;
