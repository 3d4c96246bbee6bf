//! Connection contract and factory trait

use std::future::Future;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::BoxError;

/// A bidirectional byte stream that can be pooled.
///
/// Anything that is `AsyncRead + AsyncWrite + Unpin + Send + 'static`
/// qualifies: `TcpStream`, `UnixStream`, TLS streams, in-memory duplex
/// pipes. Physically closing a connection means shutting down its write
/// half and dropping it.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// Factory trait for creating new connections
///
/// A pool calls `create` at most once per creation attempt and never
/// retries a failed call on its own.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// The raw connection type this factory produces
    type Connection: Connection;

    /// Create a new connection
    async fn create(&self) -> Result<Self::Connection, BoxError>;
}

/// Async closures returning a connection are factories too.
///
/// ```ignore
/// let pool = Pool::new(1, 4, || tokio::net::TcpStream::connect("127.0.0.1:6379")).await?;
/// ```
#[async_trait]
impl<F, Fut, C, E> ConnectionFactory for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, E>> + Send,
    C: Connection,
    E: Into<BoxError>,
{
    type Connection = C;

    async fn create(&self) -> Result<C, BoxError> {
        (self)().await.map_err(Into::into)
    }
}

/// Physically close a raw connection.
///
/// Shuts down the write half so the peer observes EOF, then drops the
/// stream. Shutdown failures are logged, never returned: the connection
/// is gone either way.
pub async fn close_connection<C: Connection>(mut conn: C) {
    if let Err(error) = conn.shutdown().await {
        tracing::warn!(%error, "failed to shut down connection cleanly");
    }
    drop(conn);
}
