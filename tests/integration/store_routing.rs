use crate::support::files_under;
use sfstree::config::ConfigLoader;
use sfstree::{ItemId, NodeRecord, StorageError, TreeStore};
use tempfile::TempDir;

fn store_from_file(temp: &TempDir) -> TreeStore {
    let file = temp.path().join("sfstree.yml");
    std::fs::write(
        &file,
        "physical_root_path: data\n\
         trees:\n\
         \x20 - name: core\n\
         \x20   global_root_path: /sitecore\n\
         \x20 - name: layouts\n\
         \x20   global_root_path: /sitecore/layout\n\
         \x20   database_name: web\n",
    )
    .unwrap();
    let config = ConfigLoader::load(temp.path()).unwrap();
    TreeStore::from_config(&config).unwrap()
}

fn save(store: &TreeStore, parent: Option<&NodeRecord>, path: &str) -> NodeRecord {
    let mut item = NodeRecord::new(
        ItemId::new_v4(),
        parent.map(|p| p.id).unwrap_or_else(ItemId::nil),
        path,
        "master",
    );
    store.save(&mut item).unwrap();
    item
}

#[test]
fn items_land_in_the_most_specific_tree() {
    let temp = TempDir::new().unwrap();
    let store = store_from_file(&temp);
    let root = save(&store, None, "/sitecore");
    let layout = save(&store, Some(&root), "/sitecore/layout");
    let renderings = save(&store, Some(&layout), "/sitecore/layout/Renderings");

    let layouts = store.tree("layouts").unwrap();
    assert_eq!(layouts.database_name(), "web");
    assert!(layouts.physical_root().ends_with("data/layouts"));
    assert!(renderings
        .physical_locator
        .as_ref()
        .unwrap()
        .starts_with(layouts.physical_root()));
    assert_eq!(files_under(layouts.physical_root()).len(), 2);
    assert_eq!(files_under(store.tree("core").unwrap().physical_root()).len(), 1);

    let found = store.items_by_path("/SITECORE/Layout/renderings").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, renderings.id);
    assert_eq!(store.children(&root).unwrap()[0].id, layout.id);
}

#[test]
fn solidity_is_per_tree() {
    let temp = TempDir::new().unwrap();
    let store = store_from_file(&temp);
    let root = save(&store, None, "/sitecore");

    // The layouts tree has no root yet, so its descendants cannot be saved
    let mut orphan = NodeRecord::new(ItemId::new_v4(), root.id, "/sitecore/layout/x", "master");
    assert!(matches!(
        store.save(&mut orphan).unwrap_err(),
        StorageError::OrphanParent { .. }
    ));
}

#[test]
fn move_between_trees_and_back() {
    let temp = TempDir::new().unwrap();
    let store = store_from_file(&temp);
    let root = save(&store, None, "/sitecore");
    let layout = save(&store, Some(&root), "/sitecore/layout");
    let folder = save(&store, Some(&root), "/sitecore/Shared");
    let leaf = save(&store, Some(&folder), "/sitecore/Shared/Header");

    let mut into_layouts = folder.clone();
    into_layouts.parent_id = layout.id;
    into_layouts.path = "/sitecore/layout/Shared".to_string();
    store.move_or_rename(&into_layouts, "/sitecore/Shared").unwrap();

    let core = store.tree("core").unwrap();
    assert_eq!(files_under(core.physical_root()).len(), 1);
    assert_eq!(
        store.item_by_id(leaf.id).unwrap().unwrap().path,
        "/sitecore/layout/Shared/Header"
    );

    let mut back = into_layouts.clone();
    back.parent_id = root.id;
    back.path = "/sitecore/Shared".to_string();
    store.move_or_rename(&back, "/sitecore/layout/Shared").unwrap();

    assert_eq!(files_under(core.physical_root()).len(), 3);
    assert_eq!(files_under(store.tree("layouts").unwrap().physical_root()).len(), 1);
    assert_eq!(
        store.items_by_path("/sitecore/shared/header").unwrap()[0].id,
        leaf.id
    );
}
