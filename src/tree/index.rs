//! Item id to file index
//!
//! A hint, never the source of truth: every hit is re-read and checked
//! before it is returned.

use crate::types::ItemId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ItemIndex {
    paths: RwLock<HashMap<ItemId, PathBuf>>,
}

impl ItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: ItemId, path: &Path) {
        self.paths.write().insert(id, path.to_path_buf());
    }

    pub fn get(&self, id: &ItemId) -> Option<PathBuf> {
        self.paths.read().get(id).cloned()
    }

    /// Drop the entry for `id` only while it still points at `path`
    pub fn evict(&self, id: &ItemId, path: &Path) {
        let mut paths = self.paths.write();
        if paths.get(id).map(|p| p == path).unwrap_or(false) {
            paths.remove(id);
        }
    }

    pub fn replace_all(&self, entries: HashMap<ItemId, PathBuf>) {
        *self.paths.write() = entries;
    }

    pub fn clear(&self) {
        self.paths.write().clear();
    }

    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }
}
