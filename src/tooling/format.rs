//! Format trees, items and verification reports as text or JSON.

use crate::error::ApiError;
use crate::tree::VerifyReport;
use crate::types::{ItemId, NodeRecord};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One configured tree as shown by `sfstree trees`
#[derive(Debug, Clone, Serialize)]
pub struct TreeSummary {
    pub name: String,
    pub global_root_path: String,
    pub database_name: String,
    pub physical_root: PathBuf,
    pub max_relative_path_length: usize,
    pub has_root: bool,
}

/// An item together with the file it was read from
#[derive(Debug, Clone, Serialize)]
pub struct ItemView<'a> {
    pub id: ItemId,
    pub parent_id: ItemId,
    pub name: &'a str,
    pub path: &'a str,
    pub database_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<ItemId>,
    #[serde(skip_serializing_if = "no_fields")]
    pub fields: &'a BTreeMap<String, String>,
    pub file: Option<&'a PathBuf>,
}

impl<'a> From<&'a NodeRecord> for ItemView<'a> {
    fn from(record: &'a NodeRecord) -> Self {
        Self {
            id: record.id,
            parent_id: record.parent_id,
            name: &record.name,
            path: &record.path,
            database_name: &record.database_name,
            template_id: record.template_id,
            fields: &record.fields,
            file: record.physical_locator.as_ref(),
        }
    }
}

fn no_fields(fields: &&BTreeMap<String, String>) -> bool {
    fields.is_empty()
}

pub struct SubtreeLine {
    pub depth: usize,
    pub item: NodeRecord,
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_trees_text(trees: &[TreeSummary]) -> String {
    if trees.is_empty() {
        return "No trees configured.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Tree", "Global root", "Database", "Physical root", "Budget", "Root"]);
    for tree in trees {
        table.add_row(vec![
            tree.name.clone(),
            tree.global_root_path.clone(),
            tree.database_name.clone(),
            tree.physical_root.display().to_string(),
            tree.max_relative_path_length.to_string(),
            if tree.has_root { "yes" } else { "no" }.to_string(),
        ]);
    }
    format!("{}\n\n{}\n", format_section_heading("Trees"), table)
}

pub fn format_trees_json(trees: &[TreeSummary]) -> Result<String, ApiError> {
    to_json(&trees)
}

pub fn format_items_text(items: &[NodeRecord]) -> String {
    if items.is_empty() {
        return "No items.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Id", "Path", "File"]);
    for item in items {
        table.add_row(vec![
            item.name.clone(),
            item.id.to_string(),
            item.path.clone(),
            item.physical_locator
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    let mut out = format!("{}\n", table);

    // A single item also gets its fields listed
    if let [item] = items {
        if !item.fields.is_empty() {
            let mut fields = Table::new();
            fields.load_preset(UTF8_BORDERS_ONLY);
            fields.set_header(vec!["Field", "Value"]);
            for (key, value) in &item.fields {
                fields.add_row(vec![key.clone(), value.clone()]);
            }
            out.push_str(&format!(
                "\n{}\n\n{}\n",
                format_section_heading("Fields"),
                fields
            ));
        }
    }
    out
}

pub fn format_items_json(items: &[NodeRecord]) -> Result<String, ApiError> {
    let views: Vec<ItemView<'_>> = items.iter().map(ItemView::from).collect();
    to_json(&views)
}

/// Indented hierarchy, two spaces per level
pub fn format_subtree_text(lines: &[SubtreeLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&format!(
            "{}{} {}\n",
            "  ".repeat(line.depth),
            line.item.name,
            line.item.id.to_string().dimmed()
        ));
    }
    out
}

/// Outcome line for `sfstree remove`
pub fn format_removal(path: &str, id: ItemId, removed: bool) -> String {
    if removed {
        format!("Removed {} ({})", path, id)
    } else {
        format!("Nothing removed: {} ({}) was not found", path, id)
    }
}

pub fn format_verify_text(reports: &[VerifyReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let status = if report.is_healthy() {
            format!("{}", "healthy".green())
        } else {
            format!("{}", "problems found".red())
        };
        out.push_str(&format!(
            "{}\n\n  Files scanned: {}\n  Status: {}\n",
            format_section_heading(&format!("Tree {}", report.tree)),
            report.files_scanned,
            status
        ));
        if report.is_healthy() {
            out.push('\n');
            continue;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Problem", "Detail"]);
        if report.root_files.len() > 1 {
            for file in &report.root_files {
                table.add_row(vec!["extra root file".to_string(), file.display().to_string()]);
            }
        }
        for duplicate in &report.duplicate_ids {
            for file in &duplicate.paths {
                table.add_row(vec![
                    format!("duplicate id {}", duplicate.id),
                    file.display().to_string(),
                ]);
            }
        }
        for file in &report.orphans {
            table.add_row(vec!["orphan".to_string(), file.display().to_string()]);
        }
        for file in &report.over_budget {
            table.add_row(vec!["over budget".to_string(), file.display().to_string()]);
        }
        for entry in &report.unreadable {
            table.add_row(vec![
                "unreadable".to_string(),
                format!("{}: {}", entry.path.display(), entry.error),
            ]);
        }
        out.push_str(&format!("\n{}\n\n", table));
    }
    out
}

pub fn format_verify_json(reports: &[VerifyReport]) -> Result<String, ApiError> {
    to_json(&reports)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to serialize output: {}", e)))
}
