//! Subtree relocation for moves and renames

use super::{IntegrityMode, SfsTree};
use crate::error::StorageError;
use crate::tree::path;
use crate::types::NodeRecord;
use std::collections::HashSet;
use std::path::PathBuf;

/// A stored record seen at its post-move location
///
/// The original record is left untouched; only the virtual path and database
/// differ in the materialized copy. Parent ids below the moved item do not
/// change, since every ancestor keeps its id.
pub(crate) struct RebasedRecord<'a> {
    original: &'a NodeRecord,
    path: String,
    database_name: &'a str,
}

impl<'a> RebasedRecord<'a> {
    pub(crate) fn new(original: &'a NodeRecord, old_root_path: &str, moved: &'a NodeRecord) -> Self {
        Self {
            original,
            path: path::rebase(&original.path, old_root_path, &moved.path),
            database_name: &moved.database_name,
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn materialize(&self) -> NodeRecord {
        NodeRecord {
            path: self.path.clone(),
            database_name: self.database_name.to_string(),
            physical_locator: None,
            ..self.original.clone()
        }
    }
}

impl SfsTree {
    /// Write `moved` and then each of `descendants` at their rebased paths
    ///
    /// `descendants` must be in breadth-first order so every parent is written
    /// before its children. Returns the moved item's file and every file
    /// written.
    pub(crate) fn save_rebased(
        &self,
        moved: &NodeRecord,
        old_root_path: &str,
        descendants: &[NodeRecord],
    ) -> Result<(PathBuf, HashSet<PathBuf>), StorageError> {
        let mut written = HashSet::new();
        let target = self.save_with(moved, IntegrityMode::MoveTransition)?;
        written.insert(target.clone());

        for descendant in descendants {
            let view = RebasedRecord::new(descendant, old_root_path, moved);
            tracing::trace!(tree = %self.name, id = %descendant.id, to = view.path(), "Rewriting descendant");
            written.insert(self.save_with(&view.materialize(), IntegrityMode::MoveTransition)?);
        }
        Ok((target, written))
    }
}
