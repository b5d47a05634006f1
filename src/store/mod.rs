//! Tree Store
//!
//! Owns every configured tree and routes each operation to the tree whose
//! global root covers the virtual path. When global roots nest, the most
//! specific root wins. All trees share one lock registry.

use crate::concurrency::PathLockRegistry;
use crate::config::StoreConfig;
use crate::error::{ApiError, StorageError};
use crate::formatter::{Formatter, YamlFormatter};
use crate::tree::path::{self, fold_case};
use crate::tree::{SfsTree, TreeSettings, VerifyReport};
use crate::types::{ItemId, NodeRecord};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub struct TreeStore {
    trees: Vec<SfsTree>,
    locks: Arc<PathLockRegistry>,
}

impl TreeStore {
    /// Open every tree described by `config`, serializing records as YAML
    pub fn from_config(config: &StoreConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let settings = config
            .trees
            .iter()
            .map(|tree| tree.to_settings(&config.physical_root_path))
            .collect();
        Ok(Self::open(
            settings,
            Arc::new(YamlFormatter::new()),
            Arc::new(PathLockRegistry::new()),
        )?)
    }

    pub fn open(
        settings: Vec<TreeSettings>,
        formatter: Arc<dyn Formatter>,
        locks: Arc<PathLockRegistry>,
    ) -> Result<Self, StorageError> {
        let trees = settings
            .into_iter()
            .map(|s| SfsTree::new(s, formatter.clone(), locks.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        info!(trees = trees.len(), "Opened tree store");
        Ok(Self { trees, locks })
    }

    pub fn trees(&self) -> &[SfsTree] {
        &self.trees
    }

    pub fn tree(&self, name: &str) -> Option<&SfsTree> {
        self.trees.iter().find(|t| t.name() == name)
    }

    pub fn locks(&self) -> Arc<PathLockRegistry> {
        self.locks.clone()
    }

    /// The tree with the most specific global root covering `virtual_path`
    pub fn tree_for_path(&self, virtual_path: &str) -> Option<&SfsTree> {
        self.trees
            .iter()
            .filter(|t| t.contains_path(virtual_path))
            .max_by_key(|t| path::segments(t.global_root_path()).len())
    }

    pub fn save(&self, item: &mut NodeRecord) -> Result<PathBuf, StorageError> {
        let tree = self
            .tree_for_path(&item.path)
            .ok_or_else(|| StorageError::NoTreeForPath(item.path.clone()))?;
        tree.save(item)
    }

    pub fn remove(&self, item: &NodeRecord) -> Result<bool, StorageError> {
        match self.tree_for_path(&item.path) {
            Some(tree) => tree.remove(item),
            None => Ok(false),
        }
    }

    pub fn items_by_path(&self, virtual_path: &str) -> Result<Vec<NodeRecord>, StorageError> {
        match self.tree_for_path(virtual_path) {
            Some(tree) => tree.items_by_path(virtual_path),
            None => Ok(Vec::new()),
        }
    }

    pub fn item_by_id(&self, id: ItemId) -> Result<Option<NodeRecord>, StorageError> {
        for tree in &self.trees {
            if let Some(found) = tree.item_by_id(id)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Root item of every tree that has one
    pub fn root_items(&self) -> Result<Vec<NodeRecord>, StorageError> {
        let mut roots = Vec::new();
        for tree in &self.trees {
            roots.extend(tree.root_item()?);
        }
        Ok(roots)
    }

    /// Children of `item`, including the roots of trees mounted directly below it
    pub fn children(&self, item: &NodeRecord) -> Result<Vec<NodeRecord>, StorageError> {
        let owner = self
            .tree_for_path(&item.path)
            .ok_or_else(|| StorageError::NoTreeForPath(item.path.clone()))?;
        let mut children = owner.children(item)?;
        let mut seen: HashSet<ItemId> = children.iter().map(|c| c.id).collect();

        for tree in &self.trees {
            if tree.name() == owner.name() {
                continue;
            }
            let mounted_here = path::parent(tree.global_root_path())
                .map(|parent| path::paths_equal(&parent, &item.path))
                .unwrap_or(false);
            if !mounted_here {
                continue;
            }
            if let Some(root) = tree.root_item()? {
                if root.parent_id == item.id && seen.insert(root.id) {
                    debug!(tree = tree.name(), id = %root.id, "Adding mounted tree root as child");
                    children.push(root);
                }
            }
        }

        children.sort_by(|a, b| {
            fold_case(&a.name)
                .cmp(&fold_case(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(children)
    }

    /// Move or rename `moved` from `old_path`, possibly into another tree
    ///
    /// Within one tree this delegates to the tree. Across trees the whole
    /// subtree is written into the target tree before anything is removed from
    /// the source tree.
    pub fn move_or_rename(
        &self,
        moved: &NodeRecord,
        old_path: &str,
    ) -> Result<PathBuf, StorageError> {
        let target = self
            .tree_for_path(&moved.path)
            .ok_or_else(|| StorageError::NoTreeForPath(moved.path.clone()))?;
        let Some(source) = self.tree_for_path(old_path) else {
            info!(id = %moved.id, old_path, "No tree held the old path, saving in place");
            return target.save(&mut moved.clone());
        };
        if source.name() == target.name() {
            return target.move_or_rename(moved, old_path);
        }
        if path::is_within(&moved.path, old_path) {
            return Err(StorageError::MoveIntoDescendant {
                from: old_path.to_string(),
                to: moved.path.clone(),
            });
        }

        let old_root = source
            .items_by_path(old_path)?
            .into_iter()
            .find(|r| r.id == moved.id);
        let Some(old_root) = old_root else {
            info!(id = %moved.id, old_path, "Moved item not stored at old path, saving in place");
            return target.save(&mut moved.clone());
        };

        let subtree = source.collect_subtree(old_root)?;
        let (written, files) = target.save_rebased(moved, old_path, &subtree[1..])?;
        source.remove(&subtree[0])?;
        info!(
            id = %moved.id,
            from_tree = source.name(),
            to_tree = target.name(),
            written = files.len(),
            "Moved item across trees"
        );
        Ok(written)
    }

    pub fn verify(&self) -> Result<Vec<VerifyReport>, StorageError> {
        self.trees.iter().map(SfsTree::verify).collect()
    }
}
