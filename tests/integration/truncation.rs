use crate::support::{open_tree_with_name_limit, save_child, save_root};
use tempfile::TempDir;

#[test]
fn truncated_names_resolve_to_the_right_item() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_name_limit(&temp, "/sitecore", 6);
    let root = save_root(&tree);
    let x = save_child(&tree, &root, "abcdefX");
    let y = save_child(&tree, &root, "abcdefY");
    let inner = save_child(&tree, &y, "inner");

    // The root name is cut as well
    let dir = tree.physical_root().join("siteco");
    assert_eq!(
        root.physical_locator.clone().unwrap(),
        tree.physical_root().join("siteco.yml")
    );
    assert_eq!(x.physical_locator.clone().unwrap(), dir.join("abcdef.yml"));
    assert_eq!(
        y.physical_locator.clone().unwrap(),
        dir.join(format!("abcdef_{}.yml", y.id))
    );
    assert_eq!(
        inner.physical_locator.clone().unwrap(),
        dir.join(format!("abcdef_{}", y.id)).join("inner.yml")
    );

    for (path, expected) in [
        ("/sitecore", root.id),
        ("/sitecore/abcdefX", x.id),
        ("/sitecore/ABCDEFY", y.id),
        ("/sitecore/abcdefY/inner", inner.id),
    ] {
        let found = tree.items_by_path(path).unwrap();
        assert_eq!(found.len(), 1, "{}", path);
        assert_eq!(found[0].id, expected, "{}", path);
    }
    assert!(tree.items_by_path("/sitecore/abcdefX/inner").unwrap().is_empty());
    assert!(tree.items_by_path("/sitecore/abcdefZ").unwrap().is_empty());
}

#[test]
fn resave_of_truncated_item_reuses_its_file() {
    let temp = TempDir::new().unwrap();
    let tree = open_tree_with_name_limit(&temp, "/sitecore", 6);
    let root = save_root(&tree);
    save_child(&tree, &root, "abcdefX");
    let mut y = save_child(&tree, &root, "abcdefY");
    let before = y.physical_locator.clone().unwrap();

    assert_eq!(tree.save(&mut y).unwrap(), before);
    assert_eq!(tree.children(&root).unwrap().len(), 2);
}
