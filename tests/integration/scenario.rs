use crate::support::{open_tree, save_child, save_root};
use std::collections::HashSet;
use tempfile::TempDir;

#[test]
fn root_then_two_templates_siblings() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree(&temp, "/sitecore");

    let root = save_root(&tree);
    assert_eq!(tree.root_item().unwrap().unwrap().name, "sitecore");

    let first = save_child(&tree, &root, "templates");
    let children = tree.children(&root).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "templates");

    let second = save_child(&tree, &root, "templates");
    let items = tree.items_by_path("/sitecore/templates").unwrap();
    assert_eq!(items.len(), 2);

    let ids: HashSet<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, HashSet::from([first.id, second.id]));
    let files: HashSet<_> = items
        .iter()
        .map(|i| i.physical_locator.clone().unwrap())
        .collect();
    assert_eq!(files.len(), 2);
    assert_eq!(tree.children(&root).unwrap().len(), 2);
}

#[test]
fn resave_is_idempotent_and_round_trips() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree(&temp, "/sitecore/content");
    let root = save_root(&tree);
    let mut home = save_child(&tree, &root, "Home");
    home.fields.insert("Title".to_string(), "Welcome".to_string());

    let first = home.physical_locator.clone().unwrap();
    let second = tree.save(&mut home).unwrap();
    assert_eq!(first, second);

    let stored = tree.item_by_id(home.id).unwrap().unwrap();
    assert_eq!(stored.without_locator(), home.without_locator());
    assert_eq!(stored.fields["Title"], "Welcome");
}

#[test]
fn descendants_span_every_level() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree(&temp, "/sitecore");
    let root = save_root(&tree);
    let a = save_child(&tree, &root, "a");
    let b = save_child(&tree, &a, "b");
    save_child(&tree, &b, "c");

    let paths: Vec<String> = tree
        .descendants(&root)
        .unwrap()
        .into_iter()
        .map(|d| d.path)
        .collect();
    assert_eq!(paths, vec!["/sitecore/a", "/sitecore/a/b", "/sitecore/a/b/c"]);
}
