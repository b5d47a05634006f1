//! Child enumeration
//!
//! An item's children live in two places: its natural children directory
//! next to its own file, and the loopback directory named after its id
//! directly under the physical root.

use super::{IntegrityMode, SfsTree};
use crate::error::StorageError;
use crate::tree::path::fold_case;
use crate::types::{ItemId, NodeRecord};
use std::path::{Path, PathBuf};

impl SfsTree {
    /// Direct children of `item`, ordered by name
    pub fn children(&self, item: &NodeRecord) -> Result<Vec<NodeRecord>, StorageError> {
        let located = self
            .locate(item, IntegrityMode::Strict)?
            .ok_or_else(|| self.not_persisted(item))?;
        let Some(file) = located.physical_locator.as_deref() else {
            return Err(self.not_persisted(item));
        };
        self.read_children(file, located.id)
    }

    /// Record files of the direct children of the item stored in `item_file`
    pub(crate) fn child_paths(
        &self,
        item_file: &Path,
        item_id: ItemId,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let natural = self.layout.natural_children_dir(item_file);
        let loopback = self.layout.loopback_dir(item_id);

        let mut paths = self
            .layout
            .list_record_files(&natural)
            .map_err(StorageError::io(&natural))?;
        if loopback != natural {
            paths.extend(
                self.layout
                    .list_record_files(&loopback)
                    .map_err(StorageError::io(&loopback))?,
            );
        }
        Ok(paths)
    }

    pub(crate) fn read_children(
        &self,
        item_file: &Path,
        item_id: ItemId,
    ) -> Result<Vec<NodeRecord>, StorageError> {
        let mut children = self
            .child_paths(item_file, item_id)?
            .iter()
            .map(|file| self.read_record(file))
            .collect::<Result<Vec<_>, _>>()?;
        children.sort_by(|a, b| {
            fold_case(&a.name)
                .cmp(&fold_case(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(children)
    }
}
