//! SFS Tree: Serialization File System Tree
//!
//! Stores hierarchical content items as one file per item, laid out on disk
//! so that the directory structure mirrors the content tree. Same-named
//! siblings are disambiguated by id, and items whose natural path would be
//! too long for the host file system overflow into short loopback
//! directories keyed by their parent's id.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod watch;

pub use concurrency::PathLockRegistry;
pub use config::{StoreConfig, TreeConfig};
pub use error::{ApiError, StorageError};
pub use formatter::{Formatter, YamlFormatter};
pub use store::TreeStore;
pub use tree::{SfsTree, TreeSettings, VerifyReport};
pub use types::{ItemId, NodeRecord};
pub use watch::TreeWatcher;
