//! Target path allocation for saves
//!
//! A re-save reuses the file already holding the item. A new file goes into
//! the parent's natural children directory, suffixed with the item id when a
//! different item already owns the name. A path at or over the relative
//! length budget is redirected into the parent's loopback directory.

use super::layout::disambiguated_stem;
use super::{IntegrityMode, SfsTree};
use crate::error::StorageError;
use crate::tree::path::fold_case;
use crate::types::{ItemId, NodeRecord};
use std::path::PathBuf;
use tracing::debug;

impl SfsTree {
    pub(crate) fn compute_target_path(
        &self,
        item: &NodeRecord,
        parent: &NodeRecord,
        mode: IntegrityMode,
    ) -> Result<PathBuf, StorageError> {
        let Some(parent_file) = parent.physical_locator.as_deref() else {
            return Err(self.not_persisted(parent));
        };

        let name = self.layout.sanitizer().sanitize(&item.name);
        let folded = fold_case(&name);
        let folded_suffixed = fold_case(&disambiguated_stem(&name, item.id));

        let mut reusable = Vec::new();
        let mut collision = false;
        for sibling in self.child_paths(parent_file, parent.id)? {
            let Some(stem) = self.layout.folded_stem(&sibling) else {
                continue;
            };
            if !stem.starts_with(&folded) {
                continue;
            }
            let existing = self.read_record(&sibling)?;
            if existing.id == item.id {
                if stem == folded || stem == folded_suffixed {
                    reusable.push(sibling);
                }
            } else if stem == folded
                || fold_case(&self.layout.sanitizer().sanitize(&existing.name)) == folded
            {
                collision = true;
            }
        }

        if reusable.len() > 1 && mode == IntegrityMode::Strict {
            return Err(StorageError::DuplicateId {
                tree: self.name.clone(),
                id: item.id,
                paths: reusable,
            });
        }
        if let Some(existing) = reusable.into_iter().next() {
            return Ok(existing);
        }

        let file_name = if collision {
            self.layout.disambiguated_file_name(&name, item.id)
        } else {
            self.layout.file_name(&name)
        };
        let base = self.layout.natural_children_dir(parent_file).join(&file_name);
        self.fit_within_budget(base, parent.id, &file_name)
    }

    /// Redirect `candidate` into the owner's loopback directory until it fits
    fn fit_within_budget(
        &self,
        mut candidate: PathBuf,
        owner: ItemId,
        file_name: &str,
    ) -> Result<PathBuf, StorageError> {
        while !self.layout.fits(&candidate) {
            let redirected = self.layout.loopback_dir(owner).join(file_name);
            if redirected == candidate {
                return Err(StorageError::PathTooLong {
                    root: self.layout.physical_root().to_path_buf(),
                    file_name: file_name.to_string(),
                    max: self.layout.max_relative_path_length(),
                });
            }
            debug!(
                tree = %self.name,
                from = %candidate.display(),
                to = %redirected.display(),
                "Path over budget, redirecting to loopback"
            );
            candidate = redirected;
        }
        Ok(candidate)
    }
}
