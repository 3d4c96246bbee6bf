//! sockpool pool - bounded pooling for reusable network connections
//!
//! This crate owns the pool state machine, the bounded idle supply and
//! the `PooledConnection` decorator handed out to callers.

pub mod pool;

pub use pool::{IdleSupply, Pool, PoolConfig, PoolStats, PooledConnection};
pub use sockpool_core::{
    BoxError, Connection, ConnectionFactory, PoolError, PoolResult, TcpConnector,
};
