//! Connection pool implementation

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use sockpool_core::{Connection, ConnectionFactory, PoolError, PoolResult, close_connection};

use super::config::PoolConfig;
use super::pooled::PooledConnection;
use super::stats::PoolStats;
use super::supply::IdleSupply;

/// Scalar state guarded by the pool lock
struct PoolState {
    /// Live connections: idle, checked out, or reserved by an in-flight creation
    total: usize,
    /// One-way flag set by `close`
    closed: bool,
}

struct PoolInner<C> {
    /// Pool configuration
    config: PoolConfig,
    /// Connection factory
    factory: Arc<dyn ConnectionFactory<Connection = C>>,
    /// Connections not checked out
    idle: IdleSupply<C>,
    /// Accounting and open/closed flag
    state: Mutex<PoolState>,
    /// Number of callers waiting on the idle supply
    waiting: AtomicUsize,
}

/// A bounded pool of reusable connections
///
/// `Pool` is a cheap handle: clones share the same state. Every acquire
/// dispatches a detached background attempt to grow the pool by one
/// connection (up to `max_size`) and then waits on the idle supply, so a
/// caller may be served by a connection another caller returned, by the
/// eager supply, or by any in-flight creation.
///
/// The pool lock only guards scalar accounting and is never held across
/// a factory call or a wait.
pub struct Pool<C: Connection> {
    inner: Arc<PoolInner<C>>,
}

impl<C: Connection> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connection> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C: Connection> Pool<C> {
    /// Create a pool holding between `min_size` and `max_size` connections
    ///
    /// Eagerly creates `min_size` connections before returning.
    ///
    /// # Errors
    ///
    /// - `PoolError::Config` if `max_size` is 0 or `min_size > max_size`
    /// - `PoolError::Creation` if any eager creation fails; connections
    ///   created before the failure are closed and no pool is returned
    pub async fn new<F>(min_size: usize, max_size: usize, factory: F) -> PoolResult<Self>
    where
        F: ConnectionFactory<Connection = C>,
    {
        Self::with_config(PoolConfig::new(min_size, max_size), factory).await
    }

    /// Create a pool from a full configuration
    #[tracing::instrument(skip(config, factory), fields(min_size = config.min_size(), max_size = config.max_size()))]
    pub async fn with_config<F>(config: PoolConfig, factory: F) -> PoolResult<Self>
    where
        F: ConnectionFactory<Connection = C>,
    {
        config.validate()?;

        let pool = Self {
            inner: Arc::new(PoolInner {
                idle: IdleSupply::new(config.max_size()),
                factory: Arc::new(factory),
                state: Mutex::new(PoolState {
                    total: 0,
                    closed: false,
                }),
                waiting: AtomicUsize::new(0),
                config,
            }),
        };

        for _ in 0..pool.inner.config.min_size() {
            let conn = match pool.create_connection().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "eager connection creation failed");
                    for conn in pool.inner.idle.drain() {
                        close_connection(conn).await;
                    }
                    return Err(e);
                }
            };
            if let Err(conn) = pool.inner.idle.try_push(conn) {
                pool.release_slot();
                close_connection(conn).await;
            }
        }

        tracing::info!(idle = pool.inner.idle.len(), "connection pool ready");
        Ok(pool)
    }

    /// Get a connection from the pool
    ///
    /// Waits without bound for an idle connection. Closing the pool wakes
    /// the wait, which then fails with `PoolError::Closed`.
    pub async fn get(&self) -> PoolResult<PooledConnection<C>> {
        self.ensure_open()?;
        self.spawn_background_create();

        let conn = self.wait_for_idle().await?;
        Ok(PooledConnection::new(conn, self.clone()))
    }

    /// Get a connection, waiting at most `timeout`
    ///
    /// The background creation dispatched by this call is not cancelled
    /// on timeout; its connection lands in the idle supply for a later
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Timeout` if nothing became available in time.
    pub async fn get_with_timeout(&self, timeout: Duration) -> PoolResult<PooledConnection<C>> {
        self.ensure_open()?;
        self.spawn_background_create();

        match tokio::time::timeout(timeout, self.wait_for_idle()).await {
            Ok(conn) => Ok(PooledConnection::new(conn?, self.clone())),
            Err(_) => {
                tracing::debug!(?timeout, "timed out waiting for idle connection");
                Err(PoolError::Timeout(timeout))
            }
        }
    }

    /// Get a connection bounded by the configured acquire timeout, if any
    pub async fn get_with_default_timeout(&self) -> PoolResult<PooledConnection<C>> {
        match self.inner.config.acquire_timeout() {
            Some(timeout) => self.get_with_timeout(timeout).await,
            None => self.get().await,
        }
    }

    /// Return a raw connection to the idle supply
    ///
    /// Only reached through [`PooledConnection::close`], so `conn` is
    /// always one this pool handed out and already counts in `total`.
    /// Never blocks: if the idle supply is full the connection is closed
    /// and discarded.
    ///
    /// # Errors
    ///
    /// - `PoolError::Closed` if the pool is closed; the connection is closed
    /// - `PoolError::NilConnection` if `conn` is `None`; the slot it held is
    ///   released
    pub(crate) async fn put(&self, conn: Option<C>) -> PoolResult<()> {
        if self.is_closed() {
            if let Some(conn) = conn {
                close_connection(conn).await;
            }
            return Err(PoolError::Closed);
        }

        let Some(conn) = conn else {
            self.release_slot();
            return Err(PoolError::NilConnection);
        };

        match self.inner.idle.try_push(conn) {
            Ok(()) => {
                tracing::debug!("connection returned to idle supply");
                Ok(())
            }
            Err(conn) => {
                let closed = self.is_closed();
                close_connection(conn).await;
                if closed {
                    return Err(PoolError::Closed);
                }
                // A full supply means every counted connection is already
                // idle, so the surplus one was never counted.
                tracing::debug!("idle supply full, discarded returned connection");
                Ok(())
            }
        }
    }

    /// Forget a checked-out connection for accounting purposes
    ///
    /// Only reached through [`PooledConnection::destroy`]. Does not close
    /// the connection.
    pub(crate) fn remove(&self, _conn: &C) -> PoolResult<()> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        state.total = state.total.saturating_sub(1);
        tracing::debug!(total = state.total, "connection evicted from pool");
        Ok(())
    }

    /// Shut the pool down
    ///
    /// Closes every idle connection and wakes waiting callers. Checked-out
    /// connections stay with their owners.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Closed` if the pool was already closed.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) -> PoolResult<()> {
        {
            let mut state = self.inner.state.lock();
            if state.closed {
                return Err(PoolError::Closed);
            }
            state.closed = true;
        }

        let drained = self.inner.idle.drain();
        {
            let mut state = self.inner.state.lock();
            state.total = state.total.saturating_sub(drained.len());
        }

        tracing::info!(count = drained.len(), "closing idle connections");
        for conn in drained {
            close_connection(conn).await;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        let total = self.inner.state.lock().total;
        let idle = self.inner.idle.len();
        let waiting = self.inner.waiting.load(Ordering::SeqCst);
        PoolStats::new(total, idle, waiting, self.inner.config.max_size())
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Return a connection from a dropped decorator without awaiting
    pub(super) fn release_on_drop(&self, conn: C) {
        if self.is_closed() {
            tracing::debug!("pool closed, dropping released connection");
            return;
        }
        if self.inner.idle.try_push(conn).is_err() {
            tracing::debug!("idle supply unavailable, dropping released connection");
        }
    }

    fn ensure_open(&self) -> PoolResult<()> {
        if self.is_closed() {
            Err(PoolError::Closed)
        } else {
            Ok(())
        }
    }

    async fn wait_for_idle(&self) -> PoolResult<C> {
        let _waiting = WaitingGuard::enter(&self.inner.waiting);
        self.inner.idle.pop().await.ok_or(PoolError::Closed)
    }

    /// Dispatch a detached attempt to add one connection to the idle supply
    fn spawn_background_create(&self) {
        let pool = self.clone();
        tokio::spawn(async move {
            match pool.create_connection().await {
                Ok(conn) => {
                    if let Err(conn) = pool.inner.idle.try_push(conn) {
                        pool.release_slot();
                        close_connection(conn).await;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "background connection creation skipped");
                }
            }
        });
    }

    /// Reserve a slot, call the factory once, and release the slot on failure
    async fn create_connection(&self) -> PoolResult<C> {
        self.reserve_slot()?;
        match self.inner.factory.create().await {
            Ok(conn) => {
                tracing::debug!("created new connection");
                Ok(conn)
            }
            Err(source) => {
                self.release_slot();
                Err(PoolError::factory(source))
            }
        }
    }

    fn reserve_slot(&self) -> PoolResult<()> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        let max_size = self.inner.config.max_size();
        if state.total >= max_size {
            return Err(PoolError::at_capacity(state.total, max_size));
        }
        state.total += 1;
        Ok(())
    }

    fn release_slot(&self) {
        let mut state = self.inner.state.lock();
        state.total = state.total.saturating_sub(1);
    }
}

/// Tracks a caller suspended on the idle supply; cancel safe
struct WaitingGuard<'a>(&'a AtomicUsize);

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
