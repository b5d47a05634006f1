use crate::support::{files_under, open_tree_with_budget, relative_len, save_child, save_root};
use sfstree::{ItemId, NodeRecord, StorageError};
use tempfile::TempDir;

#[test]
fn deep_chain_stays_within_budget() {
    let temp = TempDir::new().unwrap();
    let budget = 80;
    let tree = open_tree_with_budget(&temp, "/sitecore", budget);
    let root = save_root(&tree);

    let mut parent = root.clone();
    let mut chain = Vec::new();
    for level in 0..12 {
        let child = save_child(&tree, &parent, &format!("level-{:02}-segment", level));
        chain.push(child.clone());
        parent = child;
    }

    for file in files_under(tree.physical_root()) {
        assert!(relative_len(&tree, &file) < budget, "{}", file.display());
    }

    // Every level is still reachable by path and as a child of its parent
    let mut expected_parent = root;
    for item in &chain {
        let found = tree.items_by_path(&item.path).unwrap();
        assert_eq!(found.len(), 1, "{}", item.path);
        assert_eq!(found[0].id, item.id);

        let children = tree.children(&expected_parent).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, item.id);
        expected_parent = found[0].clone();
    }

    // At least one level had to go through a loopback directory
    assert!(chain.iter().any(|item| {
        let file = item.physical_locator.as_ref().unwrap();
        file.parent().unwrap().parent().unwrap() == tree.physical_root()
            && file.parent().unwrap().file_name().unwrap().to_string_lossy()
                == item.parent_id.to_string()
    }));
}

#[test]
fn overflowed_child_is_listed_and_resaved_in_place() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 60);
    let root = save_root(&tree);
    let parent = save_child(&tree, &root, &"p".repeat(40));
    let mut child = save_child(&tree, &parent, "child1");

    let loopback = tree.layout().loopback_dir(parent.id);
    assert_eq!(child.physical_locator.as_deref().unwrap().parent(), Some(loopback.as_path()));

    let before = child.physical_locator.clone().unwrap();
    assert_eq!(tree.save(&mut child).unwrap(), before);
    assert_eq!(tree.children(&parent).unwrap()[0].id, child.id);
}

#[test]
fn unplaceable_name_is_an_error() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 30);
    let root = save_root(&tree);
    let mut long = NodeRecord::new(
        ItemId::new_v4(),
        root.id,
        format!("/sitecore/{}", "n".repeat(50)),
        "master",
    );
    assert!(matches!(
        tree.save(&mut long).unwrap_err(),
        StorageError::PathTooLong { .. }
    ));
}
