use crate::support::{files_under, open_tree_with_budget, save_child, save_root};
use tempfile::TempDir;

#[test]
fn recursive_removal_leaves_no_files_including_loopbacks() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 60);
    let root = save_root(&tree);
    let parent = save_child(&tree, &root, &"p".repeat(40));
    let overflowed = save_child(&tree, &parent, "child1");
    save_child(&tree, &overflowed, "grandchild");
    save_child(&tree, &parent, "c");

    let loopback = tree.layout().loopback_dir(parent.id);
    assert!(loopback.is_dir());

    assert!(tree.remove(&parent).unwrap());

    let remaining = files_under(tree.physical_root());
    assert_eq!(remaining, vec![root.physical_locator.clone().unwrap()]);
    assert!(!loopback.exists());
    assert!(!tree.physical_root().join("sitecore").join("p".repeat(40)).exists());
    assert!(tree.children(&root).unwrap().is_empty());
}

#[test]
fn removing_root_empties_tree() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 160);
    let root = save_root(&tree);
    let a = save_child(&tree, &root, "a");
    save_child(&tree, &a, "b");
    save_child(&tree, &root, "a");

    assert!(tree.remove(&root).unwrap());
    assert!(files_under(tree.physical_root()).is_empty());
    assert!(tree.root_item().unwrap().is_none());
    assert!(!tree.remove(&root).unwrap());
}

#[test]
fn removing_one_duplicate_keeps_its_sibling() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 160);
    let root = save_root(&tree);
    let first = save_child(&tree, &root, "dup");
    let second = save_child(&tree, &root, "dup");
    save_child(&tree, &second, "inner");

    assert!(tree.remove(&second).unwrap());
    let left = tree.items_by_path("/sitecore/dup").unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, first.id);
    assert!(first.physical_locator.unwrap().exists());
}

#[test]
fn removing_dot_named_item_keeps_its_siblings() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 160);
    let root = save_root(&tree);
    let keep = save_child(&tree, &root, "keep");
    let dot = save_child(&tree, &root, ".");

    let dir = tree.physical_root().join("sitecore");
    assert_eq!(dot.physical_locator.clone().unwrap(), dir.join("_.yml"));
    assert!(tree.children(&dot).unwrap().is_empty());

    assert!(tree.remove(&dot).unwrap());
    assert!(keep.physical_locator.clone().unwrap().exists());
    let left = tree.children(&root).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, keep.id);
}

#[test]
fn children_of_dot_dot_item_stay_below_it() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_budget(&temp, "/sitecore", 160);
    let root = save_root(&tree);
    let a = save_child(&tree, &root, "a");
    let up = save_child(&tree, &a, "..");
    let c = save_child(&tree, &up, "c");

    assert_eq!(
        c.physical_locator.clone().unwrap(),
        tree.physical_root()
            .join("sitecore")
            .join("a")
            .join("_")
            .join("c.yml")
    );
    let names: Vec<String> = tree
        .children(&root)
        .unwrap()
        .into_iter()
        .map(|child| child.name)
        .collect();
    assert_eq!(names, vec!["a"]);
    let found = tree.items_by_path("/sitecore/a/../c").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, c.id);

    assert!(tree.remove(&up).unwrap());
    assert!(a.physical_locator.unwrap().exists());
    assert!(tree.items_by_path("/sitecore/a/../c").unwrap().is_empty());
}
