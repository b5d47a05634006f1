use crate::support::{files_under, open_tree, open_tree_with_budget, save_child, save_root};
use sfstree::StorageError;
use tempfile::TempDir;

#[test]
fn rename_preserves_loopback_files() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 60);
    let root = save_root(&tree);
    let parent = save_child(&tree, &root, &"p".repeat(40));
    let overflowed = save_child(&tree, &parent, "child1");
    let loopback_file = overflowed.physical_locator.clone().unwrap();

    // Same length, so the child still overflows into the same loopback directory
    let mut renamed = parent.clone();
    renamed.name = "q".repeat(40);
    renamed.path = format!("/sitecore/{}", renamed.name);
    tree.move_or_rename(&renamed, &parent.path).unwrap();

    assert!(loopback_file.exists());
    assert!(!parent.physical_locator.unwrap().exists());
    let moved = tree
        .items_by_path(&format!("{}/child1", renamed.path))
        .unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, overflowed.id);
    assert_eq!(moved[0].physical_locator.as_ref(), Some(&loopback_file));
    assert_eq!(files_under(tree.physical_root()).len(), 3);
}

#[test]
fn move_under_new_parent_rewrites_paths() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree(&temp, "/sitecore");
    let root = save_root(&tree);
    let source = save_child(&tree, &root, "source");
    let target = save_child(&tree, &root, "target");
    let moving = save_child(&tree, &source, "moving");
    let leaf = save_child(&tree, &moving, "leaf");

    let mut moved = moving.clone();
    moved.parent_id = target.id;
    moved.path = "/sitecore/target/moving".to_string();
    tree.move_or_rename(&moved, &moving.path).unwrap();

    assert!(tree.children(&source).unwrap().is_empty());
    let under_target = tree.children(&target).unwrap();
    assert_eq!(under_target.len(), 1);
    assert_eq!(under_target[0].parent_id, target.id);

    let moved_leaf = tree.item_by_id(leaf.id).unwrap().unwrap();
    assert_eq!(moved_leaf.path, "/sitecore/target/moving/leaf");
    assert_eq!(moved_leaf.parent_id, moving.id);
    assert_eq!(files_under(tree.physical_root()).len(), 5);
}

#[test]
fn case_only_rename_deletes_nothing() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree(&temp, "/sitecore");
    let root = save_root(&tree);
    let item = save_child(&tree, &root, "about");
    save_child(&tree, &item, "team");

    let mut renamed = item.clone();
    renamed.name = "About".to_string();
    renamed.path = "/sitecore/About".to_string();
    tree.move_or_rename(&renamed, "/sitecore/about").unwrap();

    assert_eq!(files_under(tree.physical_root()).len(), 3);
    let stored = tree.items_by_path("/sitecore/about/team").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].path, "/sitecore/About/team");
}

#[test]
fn move_tolerates_leftover_copies_at_destination() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree(&temp, "/sitecore");
    let root = save_root(&tree);
    let old = save_child(&tree, &root, "old");
    let dest = save_child(&tree, &root, "dest");
    let x = save_child(&tree, &old, "x");
    let source_file = x.physical_locator.clone().unwrap();

    // Two files for the same id, as an earlier interrupted move would leave them
    let dest_dir = tree.physical_root().join("sitecore").join("dest");
    std::fs::create_dir_all(&dest_dir).unwrap();
    std::fs::copy(&source_file, dest_dir.join("x.yml")).unwrap();
    std::fs::copy(&source_file, dest_dir.join(format!("x_{}.yml", x.id))).unwrap();

    let mut moved = x.clone();
    moved.parent_id = dest.id;
    moved.path = "/sitecore/dest/x".to_string();
    moved.physical_locator = None;

    assert!(matches!(
        tree.save(&mut moved.clone()).unwrap_err(),
        StorageError::DuplicateId { .. }
    ));

    let written = tree.move_or_rename(&moved, &x.path).unwrap();
    assert!(written.starts_with(&dest_dir));
    assert!(!source_file.exists());
    assert!(tree.items_by_path("/sitecore/old/x").unwrap().is_empty());
    let found = tree.items_by_path("/sitecore/dest/x").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, x.id);
}
