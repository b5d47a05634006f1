//! Per-path locking for physical tree files
//!
//! Every read and write of a tree file takes the lock registered for its
//! normalized absolute path. This is the only concurrency primitive the trees
//! use: there is no lock spanning several files.

use crate::tree::path::fold_case;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Registry of per-path mutexes
///
/// Entries are created on first use and live as long as the registry. One
/// registry is shared by every tree of a store so two trees touching the same
/// file serialize on the same mutex.
pub struct PathLockRegistry {
    /// Map from normalized path to its mutex
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl PathLockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the lock guarding `path`
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let key = normalize_lock_key(path);
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(&key) {
                return lock.clone();
            }
        }

        // Another thread may have inserted the entry between the two guards
        let mut map = self.locks.write();
        map.entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of distinct paths seen so far
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }
}

impl Default for PathLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock key for a path: simplified and case-folded
pub fn normalize_lock_key(path: &Path) -> String {
    fold_case(&dunce::simplified(path).to_string_lossy())
}
