//! CLI Tooling
//!
//! Command-line interface over a configured tree store. Every command is
//! read-only except `remove`.

use crate::config::{ConfigLoader, StoreConfig};
use crate::error::ApiError;
use crate::store::TreeStore;
use crate::tooling::format::{
    format_items_json, format_items_text, format_removal, format_subtree_text, format_trees_json,
    format_trees_text, format_verify_json, format_verify_text, SubtreeLine, TreeSummary,
};
use crate::types::{ItemId, NodeRecord};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// sfstree - inspect and maintain serialized content trees
#[derive(Parser)]
#[command(name = "sfstree")]
#[command(about = "Inspect and maintain content trees serialized as plain files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for sfstree.{yml,toml,json}; relative store roots resolve here
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured trees
    Trees {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the hierarchy below a virtual path
    Tree {
        /// Virtual path to start from
        path: String,
        /// Maximum depth below the starting item
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Show the item(s) stored at a virtual path
    Get {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the direct children of the item at a virtual path
    Children {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Find an item by id across all trees
    Find {
        id: ItemId,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Remove the item at a virtual path together with its subtree
    Remove {
        path: String,
        /// Pick one item when several share the path
        #[arg(long)]
        id: Option<ItemId>,
    },
    /// Scan trees for corruption (duplicate ids, orphans, stray roots, over-long paths)
    Verify {
        /// Only verify the named tree
        #[arg(long)]
        tree: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Load configuration the way the CLI does, without opening any tree
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<StoreConfig, ApiError> {
    match config_path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(root),
    }
}

impl Cli {
    /// Fold `--log-*` flags into the loaded logging configuration
    pub fn apply_log_overrides(&self, config: &mut StoreConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

/// CLI execution context
pub struct CliContext {
    store: TreeStore,
}

impl CliContext {
    pub fn new(config: &StoreConfig) -> Result<Self, ApiError> {
        if config.trees.is_empty() {
            return Err(ApiError::ConfigError(
                "No trees configured; add a `trees` list to sfstree.yml".to_string(),
            ));
        }
        Ok(Self {
            store: TreeStore::from_config(config)?,
        })
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Trees { format } => self.handle_trees(format),
            Commands::Tree { path, depth } => self.handle_tree(path, *depth),
            Commands::Get { path, format } => {
                let items = self.store.items_by_path(path)?;
                if items.is_empty() {
                    return Err(ApiError::NotFound(format!("No item at {}", path)));
                }
                render_items(&items, format)
            }
            Commands::Children { path, format } => {
                let item = self.single_item(path, None)?;
                render_items(&self.store.children(&item)?, format)
            }
            Commands::Find { id, format } => {
                let item = self
                    .store
                    .item_by_id(*id)?
                    .ok_or_else(|| ApiError::NotFound(format!("No item with id {}", id)))?;
                render_items(std::slice::from_ref(&item), format)
            }
            Commands::Remove { path, id } => {
                let item = self.single_item(path, *id)?;
                let removed = self.store.remove(&item)?;
                info!(path = %item.path, id = %item.id, removed, "CLI remove");
                Ok(format_removal(&item.path, item.id, removed))
            }
            Commands::Verify { tree, format } => self.handle_verify(tree.as_deref(), format),
        }
    }

    fn handle_trees(&self, format: &str) -> Result<String, ApiError> {
        let summaries: Vec<TreeSummary> = self
            .store
            .trees()
            .iter()
            .map(|tree| -> Result<TreeSummary, ApiError> {
                Ok(TreeSummary {
                    name: tree.name().to_string(),
                    global_root_path: tree.global_root_path().to_string(),
                    database_name: tree.database_name().to_string(),
                    physical_root: tree.physical_root().to_path_buf(),
                    max_relative_path_length: tree.layout().max_relative_path_length(),
                    has_root: tree.root_item()?.is_some(),
                })
            })
            .collect::<Result<_, _>>()?;
        match output_format(format)? {
            OutputFormat::Text => Ok(format_trees_text(&summaries)),
            OutputFormat::Json => format_trees_json(&summaries),
        }
    }

    fn handle_tree(&self, path: &str, depth: Option<usize>) -> Result<String, ApiError> {
        let start = self.single_item(path, None)?;
        let mut lines = Vec::new();
        let mut stack = vec![(start, 0usize)];
        while let Some((item, level)) = stack.pop() {
            let children = if depth.map_or(true, |max| level < max) {
                self.store.children(&item)?
            } else {
                Vec::new()
            };
            stack.extend(children.into_iter().rev().map(|c| (c, level + 1)));
            lines.push(SubtreeLine { depth: level, item });
        }
        Ok(format_subtree_text(&lines))
    }

    fn handle_verify(&self, tree: Option<&str>, format: &str) -> Result<String, ApiError> {
        let reports = match tree {
            Some(name) => {
                let tree = self
                    .store
                    .tree(name)
                    .ok_or_else(|| ApiError::NotFound(format!("No tree named {}", name)))?;
                vec![tree.verify()?]
            }
            None => self.store.verify()?,
        };
        match output_format(format)? {
            OutputFormat::Text => Ok(format_verify_text(&reports)),
            OutputFormat::Json => format_verify_json(&reports),
        }
    }

    /// Exactly one item at `path`, narrowed by `id` when several match
    fn single_item(&self, path: &str, id: Option<ItemId>) -> Result<NodeRecord, ApiError> {
        let mut items = self.store.items_by_path(path)?;
        if let Some(id) = id {
            items.retain(|item| item.id == id);
        }
        match items.len() {
            0 => Err(ApiError::NotFound(format!("No item at {}", path))),
            1 => Ok(items.remove(0)),
            n => Err(ApiError::InvalidArgument(format!(
                "{} items share the path {}; pass --id to pick one",
                n, path
            ))),
        }
    }
}

enum OutputFormat {
    Text,
    Json,
}

fn output_format(format: &str) -> Result<OutputFormat, ApiError> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(ApiError::InvalidArgument(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn render_items(items: &[NodeRecord], format: &str) -> Result<String, ApiError> {
    match output_format(format)? {
        OutputFormat::Text => Ok(format_items_text(items)),
        OutputFormat::Json => format_items_json(items),
    }
}
