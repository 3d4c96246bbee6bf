//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a pool's accounting
///
/// `total` counts every live connection, including slots reserved by a
/// creation that is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Live connections (idle + checked out + being created)
    total: usize,
    /// Connections sitting in the idle supply
    idle: usize,
    /// Connections not idle
    active: usize,
    /// Callers currently suspended in an acquire
    waiting: usize,
    /// Upper bound on `total`
    max_size: usize,
}

impl PoolStats {
    pub fn new(total: usize, idle: usize, waiting: usize, max_size: usize) -> Self {
        Self {
            total,
            idle,
            active: total.saturating_sub(idle),
            waiting,
            max_size,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn idle(&self) -> usize {
        self.idle
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn waiting(&self) -> usize {
        self.waiting
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Fraction of the capacity that is checked out (0.0 to 1.0)
    ///
    /// Returns 0.0 for a zero-capacity snapshot.
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.active as f64 / self.max_size as f64
        }
    }

    /// Whether a new acquire would have to wait for a return
    pub fn is_full(&self) -> bool {
        self.idle == 0 && self.total >= self.max_size
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}
