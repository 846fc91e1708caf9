//! Reusable scratch storage.
//!
//! Every log call needs a byte buffer for the rendered entry and a list of
//! [`Slot`]s to resolve field overrides. [`Pool`] keeps a bounded stack of
//! both so their allocations are reused across calls. Items are handed out
//! inside a [`Pooled`] guard that gives them back on drop, on every exit
//! path, including panics and early returns.
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::pool::Pool;
//!
//! let pool: Pool<Vec<u8>> = Pool::new();
//! {
//!     let mut buf = pool.acquire();
//!     buf.extend_from_slice(b"hello");
//! }
//! // The buffer came back cleared, capacity intact.
//! assert_eq!(pool.idle(), 1);
//! assert!(pool.acquire().is_empty());
//! ```

use crate::merge::Slot;
use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Most idle items a pool keeps.
pub const MAX_IDLE: usize = 64;

/// Capacity of a freshly allocated buffer.
pub const INITIAL_BUFFER_CAPACITY: usize = 512;

/// Buffers that grew past this are dropped instead of pooled.
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Storage that can be reset and reused.
///
/// `Default` must not allocate; it stands in for the item while the guard
/// hands it back.
pub trait Recycle: Default + Send {
    /// Allocates a fresh item.
    fn fresh() -> Self;

    /// Empties the item, keeping its allocation. Returns `false` if the item
    /// should be dropped rather than reused.
    fn recycle(&mut self) -> bool;
}

impl Recycle for Vec<u8> {
    fn fresh() -> Self {
        Vec::with_capacity(INITIAL_BUFFER_CAPACITY)
    }

    fn recycle(&mut self) -> bool {
        self.clear();
        self.capacity() <= MAX_RETAINED_CAPACITY
    }
}

impl Recycle for Vec<Slot> {
    fn fresh() -> Self {
        Vec::with_capacity(16)
    }

    fn recycle(&mut self) -> bool {
        self.clear();
        true
    }
}

/// A bounded, thread-safe pool of reusable items.
pub struct Pool<T: Recycle> {
    idle: Mutex<Vec<T>>,
    max_idle: usize,
}

impl<T: Recycle> Pool<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_idle(MAX_IDLE)
    }

    /// Pool keeping at most `max_idle` items between uses.
    #[must_use]
    pub fn with_max_idle(max_idle: usize) -> Self {
        Pool {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Takes an idle item, or allocates one if none is available.
    ///
    /// The item is exclusively owned by the returned guard until it drops.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let item = self.idle.lock().pop().unwrap_or_else(T::fresh);
        Pooled { item, pool: self }
    }

    /// Number of idle items currently held.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, mut item: T) {
        if !item.recycle() {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(item);
        }
    }
}

impl<T: Recycle> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Recycle> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// Scoped ownership of a pooled item; derefs to the item.
pub struct Pooled<'a, T: Recycle> {
    item: T,
    pool: &'a Pool<T>,
}

impl<T: Recycle> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Recycle> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Recycle> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.item));
    }
}

impl<T: Recycle + fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
