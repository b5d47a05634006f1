//! Virtual path resolution
//!
//! Walks a virtual path one segment at a time from the root file. Each level
//! keeps every child whose file name starts with the sanitized segment, so
//! duplicate names fan out instead of being resolved here; callers filter the
//! candidates by decoded path or id.

use super::SfsTree;
use crate::error::StorageError;
use crate::tree::path::fold_case;
use std::path::PathBuf;
use tracing::debug;

impl SfsTree {
    /// Files that may hold the item(s) at `virtual_path`
    pub fn resolve_physical_candidates(
        &self,
        virtual_path: &str,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let Some(segments) = self.tree_local_segments(virtual_path) else {
            return Ok(Vec::new());
        };
        let Some(root_file) = self.root_file()? else {
            return Ok(Vec::new());
        };

        let mut frontier = vec![root_file];
        for segment in segments.iter().skip(1) {
            let wanted = fold_case(&self.layout.sanitizer().sanitize(segment));
            let mut next: Vec<PathBuf> = Vec::new();
            for parent_file in &frontier {
                let parent = self.read_record(parent_file)?;
                for child in self.child_paths(parent_file, parent.id)? {
                    let matches = self
                        .layout
                        .folded_stem(&child)
                        .map(|stem| stem.starts_with(&wanted))
                        .unwrap_or(false);
                    if matches && !next.contains(&child) {
                        next.push(child);
                    }
                }
            }

            if next.is_empty() {
                debug!(tree = %self.name, virtual_path, segment = %segment, "No physical match");
                return Ok(next);
            }
            frontier = next;
        }
        Ok(frontier)
    }
}
