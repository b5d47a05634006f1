//! Error types
//!
//! `StorageError` covers everything a tree or store operation can raise.
//! `ApiError` is the outer surface used by configuration, logging and the CLI.

use crate::types::ItemId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by tree and store operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// A non-root item was saved before its parent was persisted
    #[error("Cannot save {path} in tree {tree}: parent {parent_id} has no physical representation")]
    OrphanParent {
        tree: String,
        path: String,
        parent_id: ItemId,
    },

    /// More than one file sits directly under the physical root
    #[error("Tree {tree} has {count} root files: {files:?}", count = .files.len())]
    MultipleRoots { tree: String, files: Vec<PathBuf> },

    /// Two or more files decode to the same id
    #[error("Tree {tree} stores id {id} more than once: {paths:?}")]
    DuplicateId {
        tree: String,
        id: ItemId,
        paths: Vec<PathBuf>,
    },

    /// The root file already holds a different item
    #[error("Root of tree {tree} is {existing}; refusing to overwrite it with {incoming}")]
    RootConflict {
        tree: String,
        existing: ItemId,
        incoming: ItemId,
    },

    /// The item has no physical representation in the tree
    #[error("Item {id} at {path} is not persisted in tree {tree}")]
    NotPersisted {
        tree: String,
        id: ItemId,
        path: String,
    },

    /// The virtual path is not covered by the tree's global root
    #[error("Path {path} is outside tree {tree} (rooted at {root})")]
    OutsideTree {
        tree: String,
        path: String,
        root: String,
    },

    /// No configured tree covers the virtual path
    #[error("No tree is configured for path {0}")]
    NoTreeForPath(String),

    /// An item cannot be moved below itself
    #[error("Cannot move {from} into its own descendant {to}")]
    MoveIntoDescendant { from: String, to: String },

    /// Even a loopback placement exceeds the relative path budget
    #[error(
        "Cannot place {file_name} under {root:?} within {max} characters; \
         set max_item_name_length to shorten names or raise max_relative_path_length"
    )]
    PathTooLong {
        root: PathBuf,
        file_name: String,
        max: usize,
    },

    /// The formatter could not encode or decode a record
    #[error("Invalid record at {path:?}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Build a mapper that attaches `path` to an I/O error
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error signals an inconsistent tree that needs repair
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StorageError::MultipleRoots { .. } | StorageError::DuplicateId { .. }
        )
    }
}

/// Errors raised by the configuration, logging and CLI surface
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
