//! Serialization File System Tree
//!
//! Maps one subtree of a content namespace (everything at or below a global
//! root path such as `/sitecore/templates`) onto record files below a physical
//! root directory. Names are sanitized into file names, same-named siblings
//! are told apart by an id suffix, and items whose natural file path would be
//! too long are redirected into loopback directories keyed by their parent's
//! id directly under the physical root.

mod allocator;
mod children;
pub(crate) mod index;
pub mod layout;
pub mod path;
mod rebase;
mod resolver;
pub mod sanitize;
mod verify;

pub(crate) use rebase::RebasedRecord;
pub use verify::{DuplicateEntry, UnreadableEntry, VerifyReport};

use crate::concurrency::PathLockRegistry;
use crate::error::StorageError;
use crate::formatter::Formatter;
use crate::types::{ItemId, NodeRecord};
use index::ItemIndex;
use layout::TreeLayout;
use path::fold_case;
use sanitize::NameSanitizer;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const DEFAULT_OS_PATH_CEILING: usize = 240;
pub const DEFAULT_PATH_SAFETY_MARGIN: usize = 80;
pub const DEFAULT_MAX_RELATIVE_PATH_LENGTH: usize =
    DEFAULT_OS_PATH_CEILING - DEFAULT_PATH_SAFETY_MARGIN;

/// Construction parameters for one tree
#[derive(Debug, Clone)]
pub struct TreeSettings {
    pub name: String,
    pub global_root_path: String,
    pub database_name: String,
    pub physical_root_path: PathBuf,
    pub max_relative_path_length: usize,
    /// 0 means unbounded
    pub max_item_name_length: usize,
}

impl TreeSettings {
    pub fn new(
        name: impl Into<String>,
        global_root_path: impl Into<String>,
        database_name: impl Into<String>,
        physical_root_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            global_root_path: global_root_path.into(),
            database_name: database_name.into(),
            physical_root_path: physical_root_path.into(),
            max_relative_path_length: DEFAULT_MAX_RELATIVE_PATH_LENGTH,
            max_item_name_length: 0,
        }
    }

    pub fn with_max_relative_path_length(mut self, max: usize) -> Self {
        self.max_relative_path_length = max;
        self
    }

    pub fn with_max_item_name_length(mut self, max: usize) -> Self {
        self.max_item_name_length = max;
        self
    }
}

/// Whether duplicate ids are an error for the current operation
///
/// Plain saves refuse to pick between two files holding the same id at one
/// location. Moves take the first one instead, so a move can be retried over
/// the leftovers of an earlier move that stopped after writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntegrityMode {
    Strict,
    MoveTransition,
}

/// One serialization tree
pub struct SfsTree {
    name: String,
    global_root_path: String,
    database_name: String,
    layout: TreeLayout,
    formatter: Arc<dyn Formatter>,
    locks: Arc<PathLockRegistry>,
    index: Arc<ItemIndex>,
}

impl SfsTree {
    /// Create a tree, creating its physical root if needed
    pub fn new(
        settings: TreeSettings,
        formatter: Arc<dyn Formatter>,
        locks: Arc<PathLockRegistry>,
    ) -> Result<Self, StorageError> {
        let root = &settings.physical_root_path;
        std::fs::create_dir_all(root).map_err(StorageError::io(root))?;
        let physical_root = dunce::canonicalize(root).map_err(StorageError::io(root))?;

        let layout = TreeLayout::new(
            physical_root,
            formatter.file_extension(),
            NameSanitizer::new(settings.max_item_name_length),
            settings.max_relative_path_length,
        );
        debug!(
            tree = %settings.name,
            root = %layout.physical_root().display(),
            max_relative_path_length = settings.max_relative_path_length,
            "Opened tree"
        );

        Ok(Self {
            name: settings.name,
            global_root_path: path::normalize(&settings.global_root_path),
            database_name: settings.database_name,
            layout,
            formatter,
            locks,
            index: Arc::new(ItemIndex::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn global_root_path(&self) -> &str {
        &self.global_root_path
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn physical_root(&self) -> &Path {
        self.layout.physical_root()
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub(crate) fn index(&self) -> Arc<ItemIndex> {
        self.index.clone()
    }

    /// Whether `path` is at or below this tree's global root
    pub fn contains_path(&self, virtual_path: &str) -> bool {
        path::is_within(virtual_path, &self.global_root_path)
    }

    /// The single item stored directly under the physical root
    pub fn root_item(&self) -> Result<Option<NodeRecord>, StorageError> {
        self.root_file()?
            .map(|file| self.read_record(&file))
            .transpose()
    }

    /// Every item whose virtual path matches `virtual_path`, ignoring case
    pub fn items_by_path(&self, virtual_path: &str) -> Result<Vec<NodeRecord>, StorageError> {
        let wanted = fold_case(&path::normalize(virtual_path));
        let mut items = Vec::new();
        for candidate in self.resolve_physical_candidates(virtual_path)? {
            let record = self.read_record(&candidate)?;
            if fold_case(&path::normalize(&record.path)) == wanted {
                items.push(record);
            }
        }
        Ok(items)
    }

    /// Look an item up by id through the index, falling back to a full scan
    pub fn item_by_id(&self, id: ItemId) -> Result<Option<NodeRecord>, StorageError> {
        if let Some(file) = self.index.get(&id) {
            if file.is_file() {
                let record = self.read_record(&file)?;
                if record.id == id {
                    return Ok(Some(record));
                }
            }
            self.index.evict(&id, &file);
        }

        debug!(tree = %self.name, %id, "Index miss, scanning tree");
        Ok(self.scan_records()?.into_iter().find(|r| r.id == id))
    }

    /// All descendants of `item`, breadth-first
    pub fn descendants(&self, item: &NodeRecord) -> Result<Vec<NodeRecord>, StorageError> {
        let located = self
            .locate(item, IntegrityMode::Strict)?
            .ok_or_else(|| self.not_persisted(item))?;
        let mut subtree = self.collect_subtree(located)?;
        subtree.remove(0);
        Ok(subtree)
    }

    /// Persist `item`, recording its file in `item.physical_locator`
    pub fn save(&self, item: &mut NodeRecord) -> Result<PathBuf, StorageError> {
        let target = self.save_with(item, IntegrityMode::Strict)?;
        item.physical_locator = Some(target.clone());
        Ok(target)
    }

    /// Delete `item` and its whole subtree; `false` if it was not stored
    pub fn remove(&self, item: &NodeRecord) -> Result<bool, StorageError> {
        let Some(located) = self.locate(item, IntegrityMode::Strict)? else {
            debug!(tree = %self.name, id = %item.id, path = %item.path, "Nothing to remove");
            return Ok(false);
        };

        let subtree = self.collect_subtree(located)?;
        let removed = subtree.len();
        self.delete_deepest_first(subtree)?;
        info!(tree = %self.name, id = %item.id, path = %item.path, removed, "Removed item");
        Ok(true)
    }

    /// Move or rename a stored item together with its subtree
    ///
    /// `moved` carries the new name, parent and path; `old_path` is where the
    /// item currently lives. New files are all written before any old file is
    /// deleted, and old files that were rewritten in place are kept.
    pub fn move_or_rename(
        &self,
        moved: &NodeRecord,
        old_path: &str,
    ) -> Result<PathBuf, StorageError> {
        if !self.contains_path(&moved.path) {
            return Err(self.outside(&moved.path));
        }
        if path::is_within(&moved.path, old_path) && !path::paths_equal(&moved.path, old_path) {
            return Err(StorageError::MoveIntoDescendant {
                from: old_path.to_string(),
                to: moved.path.clone(),
            });
        }

        let old_root = self
            .items_by_path(old_path)?
            .into_iter()
            .find(|r| r.id == moved.id);
        let Some(old_root) = old_root else {
            info!(tree = %self.name, id = %moved.id, old_path, "Moved item not stored at old path, saving in place");
            return self.save_with(moved, IntegrityMode::Strict);
        };

        let old_subtree = self.collect_subtree(old_root)?;
        let (target, written) = self.save_rebased(moved, old_path, &old_subtree[1..])?;

        if path::paths_equal(old_path, &moved.path) {
            debug!(tree = %self.name, id = %moved.id, "Case-only rename, nothing to delete");
            return Ok(target);
        }

        let stale: Vec<NodeRecord> = old_subtree
            .into_iter()
            .filter(|r| {
                r.physical_locator
                    .as_ref()
                    .map(|file| !written.contains(file))
                    .unwrap_or(false)
            })
            .collect();
        let deleted = stale.len();
        self.delete_deepest_first(stale)?;
        info!(
            tree = %self.name,
            id = %moved.id,
            from = old_path,
            to = %moved.path,
            written = written.len(),
            deleted,
            "Moved item"
        );
        Ok(target)
    }

    pub(crate) fn save_with(
        &self,
        item: &NodeRecord,
        mode: IntegrityMode,
    ) -> Result<PathBuf, StorageError> {
        if !self.contains_path(&item.path) {
            return Err(self.outside(&item.path));
        }

        let target = if self.is_root_path(&item.path) {
            self.root_target(item)?
        } else {
            let parent =
                self.resolve_parent(item, mode)?
                    .ok_or_else(|| StorageError::OrphanParent {
                        tree: self.name.clone(),
                        path: item.path.clone(),
                        parent_id: item.parent_id,
                    })?;
            self.compute_target_path(item, &parent, mode)?
        };

        self.write_record(item, &target)?;
        info!(
            tree = %self.name,
            id = %item.id,
            path = %item.path,
            file = %target.display(),
            "Saved item"
        );
        Ok(target)
    }

    fn is_root_path(&self, virtual_path: &str) -> bool {
        path::paths_equal(virtual_path, &self.global_root_path)
    }

    /// Segments of `virtual_path` starting at this tree's root segment
    fn tree_local_segments(&self, virtual_path: &str) -> Option<Vec<String>> {
        if !self.contains_path(virtual_path) {
            return None;
        }
        let skip = path::segments(&self.global_root_path).len().saturating_sub(1);
        Some(
            path::segments(virtual_path)
                .into_iter()
                .skip(skip)
                .map(str::to_string)
                .collect(),
        )
    }

    fn root_file(&self) -> Result<Option<PathBuf>, StorageError> {
        let root = self.layout.physical_root();
        let files = self
            .layout
            .list_record_files(root)
            .map_err(StorageError::io(root))?;
        match files.len() {
            0 => Ok(None),
            1 => Ok(files.into_iter().next()),
            _ => Err(StorageError::MultipleRoots {
                tree: self.name.clone(),
                files,
            }),
        }
    }

    fn root_target(&self, item: &NodeRecord) -> Result<PathBuf, StorageError> {
        match self.root_file()? {
            Some(existing) => {
                let current = self.read_record(&existing)?;
                if current.id != item.id {
                    return Err(StorageError::RootConflict {
                        tree: self.name.clone(),
                        existing: current.id,
                        incoming: item.id,
                    });
                }
                Ok(existing)
            }
            None => {
                let name = self.layout.sanitizer().sanitize(&item.name);
                Ok(self.layout.root_file_path(&name))
            }
        }
    }

    fn resolve_parent(
        &self,
        item: &NodeRecord,
        mode: IntegrityMode,
    ) -> Result<Option<NodeRecord>, StorageError> {
        let Some(parent_path) = path::parent(&item.path) else {
            return Ok(None);
        };
        let matches = self
            .items_by_path(&parent_path)?
            .into_iter()
            .filter(|r| r.id == item.parent_id)
            .collect();
        self.single_match(item.parent_id, matches, mode)
    }

    /// The authoritative stored copy of `item`
    pub(crate) fn locate(
        &self,
        item: &NodeRecord,
        mode: IntegrityMode,
    ) -> Result<Option<NodeRecord>, StorageError> {
        let matches = self
            .items_by_path(&item.path)?
            .into_iter()
            .filter(|r| r.id == item.id)
            .collect();
        self.single_match(item.id, matches, mode)
    }

    fn single_match(
        &self,
        id: ItemId,
        mut matches: Vec<NodeRecord>,
        mode: IntegrityMode,
    ) -> Result<Option<NodeRecord>, StorageError> {
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ if mode == IntegrityMode::Strict => Err(StorageError::DuplicateId {
                tree: self.name.clone(),
                id,
                paths: matches
                    .into_iter()
                    .filter_map(|r| r.physical_locator)
                    .collect(),
            }),
            _ => Ok(Some(matches.swap_remove(0))),
        }
    }

    pub(crate) fn read_record(&self, file: &Path) -> Result<NodeRecord, StorageError> {
        let lock = self.locks.lock_for(file);
        let _guard = lock.lock();

        let handle = File::open(file).map_err(StorageError::io(file))?;
        let mut reader = BufReader::new(handle);
        let mut record = self.formatter.read(&mut reader, file)?;
        record.physical_locator = Some(file.to_path_buf());
        self.index.record(record.id, file);
        Ok(record)
    }

    fn write_record(&self, record: &NodeRecord, target: &Path) -> Result<(), StorageError> {
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir).map_err(StorageError::io(dir))?;
        }

        let lock = self.locks.lock_for(target);
        let _guard = lock.lock();

        let handle = File::create(target).map_err(StorageError::io(target))?;
        let mut writer = BufWriter::new(handle);
        self.formatter.write(record, &mut writer, target)?;
        writer.flush().map_err(StorageError::io(target))?;
        self.index.record(record.id, target);
        Ok(())
    }

    /// `root` followed by its descendants, breadth-first
    pub(crate) fn collect_subtree(
        &self,
        root: NodeRecord,
    ) -> Result<Vec<NodeRecord>, StorageError> {
        let mut visited = HashSet::new();
        let mut collected = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(record) = queue.pop_front() {
            let Some(file) = record.physical_locator.clone() else {
                continue;
            };
            if !visited.insert(file.clone()) {
                continue;
            }
            queue.extend(self.read_children(&file, record.id)?);
            collected.push(record);
        }
        Ok(collected)
    }

    fn delete_deepest_first(&self, mut records: Vec<NodeRecord>) -> Result<(), StorageError> {
        records.sort_by(|a, b| fold_case(&b.path).cmp(&fold_case(&a.path)));
        for record in &records {
            self.delete_physical(record)?;
        }
        Ok(())
    }

    fn delete_physical(&self, record: &NodeRecord) -> Result<(), StorageError> {
        let Some(file) = record.physical_locator.as_deref() else {
            return Ok(());
        };

        {
            let lock = self.locks.lock_for(file);
            let _guard = lock.lock();
            match std::fs::remove_file(file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::io(file)(e)),
            }
        }

        self.remove_dir_if_empty(&self.layout.natural_children_dir(file))?;
        self.remove_dir_if_empty(&self.layout.loopback_dir(record.id))?;
        self.index.evict(&record.id, file);
        debug!(tree = %self.name, id = %record.id, file = %file.display(), "Deleted item file");
        Ok(())
    }

    fn remove_dir_if_empty(&self, dir: &Path) -> Result<(), StorageError> {
        if !dir.is_dir() {
            return Ok(());
        }
        let mut entries = std::fs::read_dir(dir).map_err(StorageError::io(dir))?;
        if entries.next().is_some() {
            debug!(dir = %dir.display(), "Directory still in use, keeping it");
            return Ok(());
        }
        std::fs::remove_dir(dir).map_err(StorageError::io(dir))
    }

    fn scan_record_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        let root = self.layout.physical_root();
        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                StorageError::Io {
                    path,
                    source: e.into(),
                }
            })?;
            if entry.file_type().is_file() && self.layout.has_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Read every record in the tree and rebuild the id index
    fn scan_records(&self) -> Result<Vec<NodeRecord>, StorageError> {
        let mut by_id: HashMap<ItemId, Vec<NodeRecord>> = HashMap::new();
        for file in self.scan_record_files()? {
            let record = self.read_record(&file)?;
            by_id.entry(record.id).or_default().push(record);
        }

        if let Some((id, copies)) = by_id.iter().find(|(_, copies)| copies.len() > 1) {
            warn!(tree = %self.name, %id, copies = copies.len(), "Duplicate id found during scan");
            return Err(StorageError::DuplicateId {
                tree: self.name.clone(),
                id: *id,
                paths: copies
                    .iter()
                    .filter_map(|r| r.physical_locator.clone())
                    .collect(),
            });
        }

        self.index.replace_all(
            by_id
                .iter()
                .filter_map(|(id, copies)| copies[0].physical_locator.clone().map(|p| (*id, p)))
                .collect(),
        );
        Ok(by_id.into_values().flatten().collect())
    }

    fn not_persisted(&self, item: &NodeRecord) -> StorageError {
        StorageError::NotPersisted {
            tree: self.name.clone(),
            id: item.id,
            path: item.path.clone(),
        }
    }

    fn outside(&self, virtual_path: &str) -> StorageError {
        StorageError::OutsideTree {
            tree: self.name.clone(),
            path: virtual_path.to_string(),
            root: self.global_root_path.clone(),
        }
    }
}
