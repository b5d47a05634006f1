//! Whole-tree consistency scan

use super::SfsTree;
use crate::error::StorageError;
use crate::types::ItemId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Findings of a full scan; nothing here is repaired automatically
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub tree: String,
    pub files_scanned: usize,
    pub root_files: Vec<PathBuf>,
    pub duplicate_ids: Vec<DuplicateEntry>,
    /// Records whose parent id is not stored anywhere in the tree
    pub orphans: Vec<PathBuf>,
    pub over_budget: Vec<PathBuf>,
    pub unreadable: Vec<UnreadableEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateEntry {
    pub id: ItemId,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnreadableEntry {
    pub path: PathBuf,
    pub error: String,
}

impl VerifyReport {
    pub fn is_healthy(&self) -> bool {
        self.root_files.len() <= 1
            && self.duplicate_ids.is_empty()
            && self.orphans.is_empty()
            && self.over_budget.is_empty()
            && self.unreadable.is_empty()
    }
}

impl SfsTree {
    /// Scan every record file and report structural problems
    pub fn verify(&self) -> Result<VerifyReport, StorageError> {
        let files = self.scan_record_files()?;
        let mut report = VerifyReport {
            tree: self.name.clone(),
            files_scanned: files.len(),
            ..Default::default()
        };

        let mut by_id: HashMap<ItemId, Vec<PathBuf>> = HashMap::new();
        let mut parents = Vec::new();
        for file in files {
            if file.parent() == Some(self.layout.physical_root()) {
                report.root_files.push(file.clone());
            }
            if !self.layout.fits(&file) && file.parent() != Some(self.layout.physical_root()) {
                report.over_budget.push(file.clone());
            }
            match self.read_record(&file) {
                Ok(record) => {
                    if !self.is_root_path(&record.path) {
                        parents.push((record.parent_id, file.clone()));
                    }
                    by_id.entry(record.id).or_default().push(file);
                }
                Err(e) => report.unreadable.push(UnreadableEntry {
                    path: file,
                    error: e.to_string(),
                }),
            }
        }

        let stored: HashSet<ItemId> = by_id.keys().copied().collect();
        report.orphans = parents
            .into_iter()
            .filter(|(parent_id, _)| !stored.contains(parent_id))
            .map(|(_, file)| file)
            .collect();

        let mut duplicates: Vec<DuplicateEntry> = by_id
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(id, paths)| DuplicateEntry { id, paths })
            .collect();
        duplicates.sort_by(|a, b| a.id.cmp(&b.id));
        report.duplicate_ids = duplicates;

        Ok(report)
    }
}
