//! Once-only initialization for process-wide instances
//!
//! `OnceSlot` hands out one shared `Arc<T>` per slot. The fast path takes a
//! read lock; only the first caller builds the value, under the write lock,
//! after checking again that no other thread got there first.

use parking_lot::RwLock;
use std::sync::Arc;

pub struct OnceSlot<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> OnceSlot<T> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// The stored value, if initialized.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.read().is_some()
    }

    /// The stored value, building it with `init` on first access.
    pub fn get_or_init<F>(&self, init: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get() {
            return value;
        }

        let mut slot = self.value.write();
        // Another thread may have initialized between the two locks
        if let Some(value) = slot.as_ref() {
            return value.clone();
        }
        let value = Arc::new(init());
        *slot = Some(value.clone());
        value
    }

    /// Like `get_or_init`, but a failed `init` leaves the slot empty.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let mut slot = self.value.write();
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = Arc::new(init()?);
        *slot = Some(value.clone());
        Ok(value)
    }
}

impl<T> Default for OnceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
