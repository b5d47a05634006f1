//! Physical layout conventions
//!
//! ```text
//! <root>/<rootName><ext>                 tree root file
//! <dir>/<name><ext>                      item file
//! <dir>/<name>_<id><ext>                 item file disambiguated from a same-named sibling
//! <dir>/<name>[_<id>]/                   natural children directory
//! <root>/<ownerId>/                      loopback directory for children of ownerId
//! ```

use crate::tree::path::fold_case;
use crate::tree::sanitize::NameSanitizer;
use crate::types::ItemId;
use std::path::{Path, PathBuf};

/// Path arithmetic for one tree: no I/O beyond directory listing
#[derive(Debug, Clone)]
pub struct TreeLayout {
    physical_root: PathBuf,
    extension: String,
    sanitizer: NameSanitizer,
    max_relative_path_length: usize,
}

impl TreeLayout {
    pub fn new(
        physical_root: PathBuf,
        extension: impl Into<String>,
        sanitizer: NameSanitizer,
        max_relative_path_length: usize,
    ) -> Self {
        Self {
            physical_root,
            extension: extension.into(),
            sanitizer,
            max_relative_path_length,
        }
    }

    pub fn physical_root(&self) -> &Path {
        &self.physical_root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn sanitizer(&self) -> &NameSanitizer {
        &self.sanitizer
    }

    pub fn max_relative_path_length(&self) -> usize {
        self.max_relative_path_length
    }

    pub fn file_name(&self, sanitized_name: &str) -> String {
        format!("{}{}", sanitized_name, self.extension)
    }

    pub fn disambiguated_file_name(&self, sanitized_name: &str, id: ItemId) -> String {
        format!("{}{}", disambiguated_stem(sanitized_name, id), self.extension)
    }

    pub fn root_file_path(&self, sanitized_root_name: &str) -> PathBuf {
        self.physical_root.join(self.file_name(sanitized_root_name))
    }

    /// Directory holding the children of the item stored in `item_file`
    pub fn natural_children_dir(&self, item_file: &Path) -> PathBuf {
        match self.stem(item_file) {
            Some(stem) => item_file.with_file_name(stem),
            None => item_file.to_path_buf(),
        }
    }

    pub fn loopback_dir(&self, owner: ItemId) -> PathBuf {
        self.physical_root.join(owner.to_string())
    }

    /// File name without the formatter extension
    pub fn stem(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_string_lossy();
        let cut = file_name.len().checked_sub(self.extension.len())?;
        if !file_name.is_char_boundary(cut)
            || !file_name[cut..].eq_ignore_ascii_case(&self.extension)
        {
            return None;
        }
        Some(file_name[..cut].to_string())
    }

    pub fn folded_stem(&self, path: &Path) -> Option<String> {
        self.stem(path).map(|stem| fold_case(&stem))
    }

    pub fn has_extension(&self, path: &Path) -> bool {
        self.stem(path).is_some()
    }

    /// Length of `path` relative to the physical root, in characters
    pub fn relative_length(&self, path: &Path) -> usize {
        let relative = path.strip_prefix(&self.physical_root).unwrap_or(path);
        relative.to_string_lossy().chars().count()
    }

    pub fn fits(&self, path: &Path) -> bool {
        self.relative_length(path) < self.max_relative_path_length
    }

    /// Files carrying the formatter extension directly inside `dir`
    pub fn list_record_files(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() && self.has_extension(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

pub fn disambiguated_stem(sanitized_name: &str, id: ItemId) -> String {
    format!("{}_{}", sanitized_name, id.hyphenated())
}
