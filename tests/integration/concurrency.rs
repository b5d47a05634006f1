use crate::support::{files_under, open_tree, save_root};
use sfstree::{ItemId, NodeRecord};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn parallel_saves_of_distinct_children() {
    let temp = TempDir::new().unwrap();
    let tree = Arc::new(open_tree(&temp, "/sitecore"));
    let root = save_root(&tree);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let tree = Arc::clone(&tree);
            let parent_id = root.id;
            thread::spawn(move || {
                for n in 0..10 {
                    let mut item = NodeRecord::new(
                        ItemId::new_v4(),
                        parent_id,
                        format!("/sitecore/w{}-{}", worker, n),
                        "master",
                    );
                    tree.save(&mut item).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tree.children(&root).unwrap().len(), 80);
    assert_eq!(files_under(tree.physical_root()).len(), 81);
}

#[test]
fn concurrent_resaves_of_one_item_leave_a_readable_file() {
    let temp = TempDir::new().unwrap();
    let tree = Arc::new(open_tree(&temp, "/sitecore"));
    let root = save_root(&tree);
    let mut shared = NodeRecord::new(ItemId::new_v4(), root.id, "/sitecore/shared", "master");
    tree.save(&mut shared).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let tree = Arc::clone(&tree);
            let mut item = shared.clone();
            thread::spawn(move || {
                for n in 0..25 {
                    item.fields
                        .insert("Revision".to_string(), format!("{}-{}", worker, n));
                    tree.save(&mut item).unwrap();
                    let read = tree.items_by_path("/sitecore/shared").unwrap();
                    assert_eq!(read.len(), 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = tree.items_by_path("/sitecore/shared").unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].fields["Revision"].ends_with("-24"));
}
