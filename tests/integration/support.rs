//! Shared fixtures

use sfstree::{ItemId, NodeRecord, PathLockRegistry, SfsTree, TreeSettings, YamlFormatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

pub fn open_tree(temp: &TempDir, global_root: &str) -> SfsTree {
    open_tree_with_budget(temp, global_root, sfstree::tree::DEFAULT_MAX_RELATIVE_PATH_LENGTH)
}

pub fn open_tree_with_budget(temp: &TempDir, global_root: &str, budget: usize) -> SfsTree {
    let settings = TreeSettings::new("it", global_root, "master", temp.path().join("it"))
        .with_max_relative_path_length(budget);
    SfsTree::new(
        settings,
        Arc::new(YamlFormatter::new()),
        Arc::new(PathLockRegistry::new()),
    )
    .unwrap()
}

pub fn open_tree_with_name_limit(temp: &TempDir, global_root: &str, max_name: usize) -> SfsTree {
    let settings = TreeSettings::new("it", global_root, "master", temp.path().join("it"))
        .with_max_item_name_length(max_name);
    SfsTree::new(
        settings,
        Arc::new(YamlFormatter::new()),
        Arc::new(PathLockRegistry::new()),
    )
    .unwrap()
}

pub fn save_root(tree: &SfsTree) -> NodeRecord {
    let mut root = NodeRecord::new(
        ItemId::new_v4(),
        ItemId::nil(),
        tree.global_root_path(),
        "master",
    );
    tree.save(&mut root).unwrap();
    root
}

pub fn save_child(tree: &SfsTree, parent: &NodeRecord, name: &str) -> NodeRecord {
    let mut child = NodeRecord::new(
        ItemId::new_v4(),
        parent.id,
        format!("{}/{}", parent.path, name),
        "master",
    );
    tree.save(&mut child).unwrap();
    child
}

/// Every regular file below `root`
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

pub fn relative_len(tree: &SfsTree, file: &Path) -> usize {
    file.strip_prefix(tree.physical_root())
        .unwrap()
        .to_string_lossy()
        .chars()
        .count()
}
