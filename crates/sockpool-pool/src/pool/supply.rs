//! Bounded idle supply
//!
//! A fixed-capacity FIFO of idle connections. The queue itself sits behind
//! a short-lived mutex; a semaphore counts queued items so waiters can
//! suspend without holding any lock.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// Fixed-capacity concurrent queue of idle items.
///
/// Invariant: the semaphore never holds more permits than the queue holds
/// items, so a waiter that obtained a permit always finds an item unless
/// the supply was drained in between.
pub struct IdleSupply<T> {
    queue: Mutex<VecDeque<T>>,
    available: Semaphore,
    capacity: usize,
}

impl<T> IdleSupply<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Semaphore::new(0),
            capacity,
        }
    }

    /// Insert without blocking.
    ///
    /// Hands the item back when the supply is full or drained.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        {
            let mut queue = self.queue.lock();
            if self.available.is_closed() || queue.len() >= self.capacity {
                return Err(item);
            }
            queue.push_back(item);
        }
        self.available.add_permits(1);
        Ok(())
    }

    /// Remove the oldest item without blocking
    pub fn try_pop(&self) -> Option<T> {
        let permit = self.available.try_acquire().ok()?;
        permit.forget();
        self.queue.lock().pop_front()
    }

    /// Wait for an item.
    ///
    /// Returns `None` once the supply has been drained. Cancel safe: a
    /// dropped wait never loses an item.
    pub async fn pop(&self) -> Option<T> {
        let permit = self.available.acquire().await.ok()?;
        permit.forget();
        self.queue.lock().pop_front()
    }

    /// Close the supply and take everything in it.
    ///
    /// Pending and future `pop` calls return `None`, future `try_push`
    /// calls hand their item back.
    pub fn drain(&self) -> Vec<T> {
        let mut queue = self.queue.lock();
        self.available.close();
        queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_drained(&self) -> bool {
        self.available.is_closed()
    }
}
