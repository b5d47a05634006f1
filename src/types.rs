//! Core types for the serialization tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// ItemId: opaque 128-bit identifier of a content item
pub type ItemId = uuid::Uuid;

/// NodeRecord: one content item as read from or written to a tree
///
/// The tree consumes `id`, `parent_id`, `name` and `path`; everything else is
/// payload carried through the formatter untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: ItemId,
    pub parent_id: ItemId,
    pub name: String,
    /// Virtual path, e.g. `/sitecore/templates/Sample`
    pub path: String,
    pub database_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    /// Absolute file backing this record; assigned by the tree, never serialized
    #[serde(skip)]
    pub physical_locator: Option<PathBuf>,
}

impl NodeRecord {
    pub fn new(
        id: ItemId,
        parent_id: ItemId,
        path: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let name = path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            parent_id,
            name,
            path,
            database_name: database_name.into(),
            template_id: None,
            fields: BTreeMap::new(),
            physical_locator: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_template(mut self, template_id: ItemId) -> Self {
        self.template_id = Some(template_id);
        self
    }

    /// Copy of the record with the physical locator cleared
    pub fn without_locator(&self) -> Self {
        Self {
            physical_locator: None,
            ..self.clone()
        }
    }
}
