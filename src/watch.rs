//! External change detection
//!
//! The id index is only a cache of where records were last seen. Editing,
//! moving or deleting record files behind the tree's back makes entries stale,
//! so a watcher drops the whole index on any structural change under the
//! physical root. Lookups verify index hits anyway; this just avoids paying
//! for a failed hit before the scan.

use crate::error::StorageError;
use crate::tree::index::ItemIndex;
use crate::tree::SfsTree;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keeps a tree's id index honest while the watcher is alive
pub struct TreeWatcher {
    tree: String,
    root: PathBuf,
    invalidations: Arc<AtomicUsize>,
    _watcher: RecommendedWatcher,
}

impl TreeWatcher {
    pub fn watch(tree: &SfsTree) -> Result<Self, StorageError> {
        let index = tree.index();
        let invalidations = Arc::new(AtomicUsize::new(0));
        let counter = invalidations.clone();
        let name = tree.name().to_string();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_structural(&event.kind) => {
                    invalidate(&index, &counter, &name, &event);
                }
                Ok(_) => {}
                Err(e) => warn!(tree = %name, "Watch error: {}", e),
            }
        })
        .map_err(|e| watch_failure(tree.physical_root(), "Failed to create watcher", e))?;

        watcher
            .watch(tree.physical_root(), RecursiveMode::Recursive)
            .map_err(|e| watch_failure(tree.physical_root(), "Failed to watch directory", e))?;
        info!(tree = tree.name(), root = %tree.physical_root().display(), "Watching tree");

        Ok(Self {
            tree: tree.name().to_string(),
            root: tree.physical_root().to_path_buf(),
            invalidations,
            _watcher: watcher,
        })
    }

    pub fn tree(&self) -> &str {
        &self.tree
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// How many times the index has been dropped so far
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::Relaxed)
    }
}

fn is_structural(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn invalidate(index: &ItemIndex, counter: &AtomicUsize, tree: &str, event: &Event) {
    let dropped = index.len();
    index.clear();
    counter.fetch_add(1, Ordering::Relaxed);
    debug!(
        tree,
        kind = ?event.kind,
        paths = ?event.paths,
        dropped,
        "Index invalidated by external change"
    );
}

fn watch_failure(root: &Path, context: &str, e: notify::Error) -> StorageError {
    StorageError::Io {
        path: root.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e)),
    }
}
