//! Pooled connection decorator

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use sockpool_core::{Connection, PoolError, PoolResult, close_connection};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::pool::Pool;

/// A connection borrowed from a [`Pool`]
///
/// Reads and writes go straight to the underlying connection.
///
/// # Closing does not close
///
/// [`PooledConnection::close`] hands the connection **back to the pool**;
/// the socket stays open for the next caller. Use
/// [`PooledConnection::destroy`] when the connection is known to be broken
/// and must not be reused: it evicts the connection from the pool's
/// accounting and then really closes it.
///
/// Dropping a `PooledConnection` without calling either returns the
/// connection to the pool as well. If the pool is closed or its idle
/// supply is full, the connection is dropped instead.
///
/// `poll_shutdown` is forwarded as-is: it half-closes the stream but does
/// not release it from the pool.
pub struct PooledConnection<C: Connection> {
    conn: Option<C>,
    pool: Pool<C>,
}

impl<C: Connection> PooledConnection<C> {
    pub(super) fn new(conn: C, pool: Pool<C>) -> Self {
        Self {
            conn: Some(conn),
            pool,
        }
    }

    /// Return the connection to the pool.
    ///
    /// The underlying socket is not closed unless the pool is closed or
    /// its idle supply is full.
    pub async fn close(mut self) -> PoolResult<()> {
        let conn = self.conn.take();
        self.pool.put(conn).await
    }

    /// Evict the connection from the pool and close it.
    ///
    /// The socket is closed even when the pool reports an error (for
    /// example `PoolError::Closed` after shutdown); the error is still
    /// returned.
    pub async fn destroy(mut self) -> PoolResult<()> {
        let Some(conn) = self.conn.take() else {
            return Err(PoolError::NilConnection);
        };
        let removed = self.pool.remove(&conn);
        close_connection(conn).await;
        removed
    }

    /// Get a reference to the underlying connection
    pub fn get_ref(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    /// Get a mutable reference to the underlying connection
    pub fn get_mut(&mut self) -> Option<&mut C> {
        self.conn.as_mut()
    }

    /// The pool this connection belongs to
    pub fn pool(&self) -> &Pool<C> {
        &self.pool
    }

    fn conn_pin(&mut self) -> io::Result<Pin<&mut C>> {
        self.conn
            .as_mut()
            .map(Pin::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "connection released"))
    }
}

impl<C: Connection> AsyncRead for PooledConnection<C> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match Pin::into_inner(self).conn_pin() {
            Ok(conn) => conn.poll_read(cx, buf),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

impl<C: Connection> AsyncWrite for PooledConnection<C> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match Pin::into_inner(self).conn_pin() {
            Ok(conn) => conn.poll_write(cx, buf),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match Pin::into_inner(self).conn_pin() {
            Ok(conn) => conn.poll_flush(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match Pin::into_inner(self).conn_pin() {
            Ok(conn) => conn.poll_shutdown(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        match Pin::into_inner(self).conn_pin() {
            Ok(conn) => conn.poll_write_vectored(cx, bufs),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn is_write_vectored(&self) -> bool {
        self.conn.as_ref().is_some_and(|conn| conn.is_write_vectored())
    }
}

impl<C: Connection> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release_on_drop(conn);
        }
    }
}
