//! Record formatters
//!
//! A formatter turns a `NodeRecord` into bytes and back, and names the file
//! extension trees use to discover records on disk. Trees treat the extension
//! as an opaque suffix.

use crate::error::StorageError;
use crate::types::NodeRecord;
use std::io::{Read, Write};
use std::path::Path;

/// Encoding of a record's payload
pub trait Formatter: Send + Sync {
    /// Extension including the leading dot, e.g. `.yml`
    fn file_extension(&self) -> &str;

    fn read(&self, reader: &mut dyn Read, source: &Path) -> Result<NodeRecord, StorageError>;

    fn write(
        &self,
        record: &NodeRecord,
        writer: &mut dyn Write,
        target: &Path,
    ) -> Result<(), StorageError>;
}

/// YAML formatter backed by `serde_yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormatter;

impl YamlFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for YamlFormatter {
    fn file_extension(&self) -> &str {
        ".yml"
    }

    fn read(&self, reader: &mut dyn Read, source: &Path) -> Result<NodeRecord, StorageError> {
        serde_yaml::from_reader(reader).map_err(|e| StorageError::Format {
            path: source.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write(
        &self,
        record: &NodeRecord,
        writer: &mut dyn Write,
        target: &Path,
    ) -> Result<(), StorageError> {
        serde_yaml::to_writer(writer, record).map_err(|e| StorageError::Format {
            path: target.to_path_buf(),
            message: e.to_string(),
        })
    }
}
