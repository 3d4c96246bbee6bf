//! Plain TCP connection factory

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::{BoxError, ConnectionFactory};

/// Dials a fixed `host:port` for every creation attempt.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    /// Address to dial, resolved on every attempt
    addr: String,
    /// Upper bound on a single dial, if any
    connect_timeout: Option<Duration>,
    /// Whether to disable Nagle's algorithm (default: true)
    nodelay: bool,
}

impl TcpConnector {
    /// Create a connector for the given `host:port`
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout: None,
            nodelay: true,
        }
    }

    /// Bound each dial by `timeout`
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set `TCP_NODELAY` on new streams
    #[must_use]
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

#[async_trait]
impl ConnectionFactory for TcpConnector {
    type Connection = TcpStream;

    async fn create(&self) -> Result<TcpStream, BoxError> {
        let connect = TcpStream::connect(self.addr.as_str());
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {} timed out after {:?}", self.addr, timeout),
                )
            })??,
            None => connect.await?,
        };
        stream.set_nodelay(self.nodelay)?;

        tracing::debug!(addr = %self.addr, "tcp connection established");
        Ok(stream)
    }
}
