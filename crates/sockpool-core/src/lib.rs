//! sockpool core - shared abstractions for pooled network connections
//!
//! This crate provides the contracts every other sockpool crate builds on:
//!
//! - `Connection` - any bidirectional async byte stream a pool can hand out
//! - `ConnectionFactory` - the injected capability that dials new connections
//! - `PoolError` - the error kinds surfaced by pool operations
//! - `TcpConnector` - a ready-made factory for plain TCP endpoints

mod connection;
mod error;
mod tcp;

pub use connection::{Connection, ConnectionFactory, close_connection};
pub use error::{BoxError, PoolError, PoolResult};
pub use tcp::TcpConnector;
