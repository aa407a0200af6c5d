//! Compute-once cells backing the lazily derived parts of a response.
//!
//! [`TryOnce`] holds a single value whose initializer may fail. The initializer
//! runs under a mutex, so concurrent first callers see exactly one computation
//! and all of them observe the same published value. A failed initializer
//! publishes nothing; the next caller runs it again.
//!
//! [`OnceMap`] keeps one [`TryOnce`] per key. The map lock is only held long
//! enough to find or insert the cell, so computations for different keys do not
//! block each other.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

pub struct TryOnce<T> {
    value: OnceLock<T>,
    init: Mutex<()>,
}

impl<T> Default for TryOnce<T> {
    fn default() -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }
}

impl<T> TryOnce<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the published value, if any.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns the published value, running `init` first if nothing has been
    /// published yet.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have published while we waited for the lock
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let value = init()?;
        Ok(self.value.get_or_init(|| value))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TryOnce<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TryOnce").field(&self.value.get()).finish()
    }
}

pub struct OnceMap<K, V> {
    cells: RwLock<HashMap<K, Arc<TryOnce<V>>>>,
}

impl<K, V> Default for OnceMap<K, V> {
    fn default() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> OnceMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value published for `key`, running `init` if there is none.
    pub fn get_or_try_init<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        self.cell(key).get_or_try_init(init).cloned()
    }

    /// Number of keys with a published value.
    pub fn len(&self) -> usize {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: K) -> Arc<TryOnce<V>> {
        {
            // Fast path: cell already exists
            let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cell) = cells.get(&key) {
                return cell.clone();
            }
        }

        self.cells
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .clone()
    }
}

impl<K, V> std::fmt::Debug for OnceMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("OnceMap").field("keys", &cells.len()).finish()
    }
}
