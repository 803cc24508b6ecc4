//! Pool - bounded free-list of reusable values
//!
//! Batches and request buffers are recycled here so the steady state
//! allocates nothing. Acquire and release are the only operations; both
//! are lock-free and safe from any thread.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crossbeam_queue::ArrayQueue;

/// A value that can be returned to a pool
pub trait Reusable {
    /// Clear contents while keeping allocated capacity
    fn reset(&mut self);
}

impl Reusable for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// Bounded free-list keyed by value type
pub struct Pool<T> {
    free: ArrayQueue<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Reusable> Pool<T> {
    /// Create a pool retaining at most `capacity` idle values
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
            factory: Box::new(factory),
        }
    }

    /// Take an idle value, or build a fresh one when none is idle
    pub fn acquire(&self) -> T {
        self.free.pop().unwrap_or_else(|| (self.factory)())
    }

    /// Reset a value and keep it for reuse
    ///
    /// The value is dropped when the free-list is already full.
    pub fn release(&self, mut value: T) {
        value.reset();
        let _ = self.free.push(value);
    }

    /// Acquire a value that returns itself to the pool on drop
    pub fn acquire_guard(&self) -> Pooled<'_, T> {
        Pooled {
            pool: self,
            value: Some(self.acquire()),
        }
    }

    /// Number of idle values
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Maximum number of idle values retained
    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("available", &self.free.len())
            .field("capacity", &self.free.capacity())
            .finish()
    }
}

/// RAII handle released back to its pool on every exit path
pub struct Pooled<'a, T: Reusable> {
    pool: &'a Pool<T>,
    value: Option<T>,
}

impl<T: Reusable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `drop` takes the value out.
        self.value.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Reusable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Reusable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}
