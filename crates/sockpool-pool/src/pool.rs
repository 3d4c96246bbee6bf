//! Connection pooling for network connections
//!
//! This module provides a bounded pool with eager minimum supply,
//! opportunistic background growth toward the maximum, bounded
//! acquisition and one-way shutdown.
//!
//! # Example
//!
//! ```ignore
//! use sockpool_pool::{Pool, TcpConnector};
//!
//! let pool = Pool::new(2, 8, TcpConnector::new("10.0.0.7:6379")).await?;
//! let mut conn = pool.get_with_timeout(Duration::from_secs(1)).await?;
//! conn.write_all(b"PING\r\n").await?;
//! // Returns the connection to the pool; the socket stays open
//! conn.close().await?;
//! ```

mod config;
mod pool;
mod pooled;
mod stats;
mod supply;


pub use config::PoolConfig;
pub use pool::Pool;
pub use pooled::PooledConnection;
pub use stats::PoolStats;
pub use supply::IdleSupply;
