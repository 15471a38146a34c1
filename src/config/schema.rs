//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Parsing from KDL documents and files
//! - Validation and merging
//!
//! # KDL Schema
//!
//! ```kdl
//! board-id 18327136960
//! page-limit 100
//! api-url "https://api.monday.com/v2"
//! llm-model "gpt-4o-mini"
//! output-format "human"  // or "json"
//!
//! // Replace the accepted column titles for a field
//! columns {
//!     dev-status "dev status" "engineering"
//!     risk-highlight "data quality"
//! }
//! ```
//!
//! API tokens are never read from config files; see the resolver.

use crate::board::client::MAX_PAGE_LIMIT;
use crate::models::FieldKey;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in a config.kdl file. `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintriskConfig {
    /// monday.com board id
    pub board_id: Option<u64>,

    /// Items fetched per page (1-500)
    pub page_limit: Option<u32>,

    /// GraphQL endpoint
    pub api_url: Option<String>,

    /// Chat model used to phrase the report
    pub llm_model: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Column title overrides per field
    #[serde(default)]
    pub columns: BTreeMap<FieldKey, Vec<String>>,
}

impl SprintriskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(limit) = self.page_limit {
            if limit == 0 || limit > MAX_PAGE_LIMIT {
                return Err(format!("page-limit must be 1-{}, got {}", MAX_PAGE_LIMIT, limit));
            }
        }
        if self.board_id == Some(0) {
            return Err("board-id must be a positive integer".to_string());
        }
        for (key, titles) in &self.columns {
            if titles.is_empty() {
                return Err(format!("columns.{} needs at least one title", key));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        if let Some(node) = doc.get("board-id") {
            let id = get_integer_arg(node)
                .ok_or_else(|| Error::Config("board-id must be an integer".to_string()))?;
            let id = u64::try_from(id)
                .map_err(|_| Error::Config(format!("board-id out of range: {}", id)))?;
            config.board_id = Some(id);
        }

        if let Some(node) = doc.get("page-limit") {
            let limit = get_integer_arg(node)
                .ok_or_else(|| Error::Config("page-limit must be an integer".to_string()))?;
            let limit = u32::try_from(limit)
                .map_err(|_| Error::Config(format!("page-limit out of range: {}", limit)))?;
            config.page_limit = Some(limit);
        }

        if let Some(node) = doc.get("api-url") {
            config.api_url = get_string_arg(node);
        }

        if let Some(node) = doc.get("llm-model") {
            config.llm_model = get_string_arg(node);
        }

        if let Some(node) = doc.get("output-format") {
            if let Some(s) = get_string_arg(node) {
                config.output_format = Some(OutputFormat::parse(&s).ok_or_else(|| {
                    Error::Config(format!("output-format must be json or human, got {}", s))
                })?);
            }
        }

        if let Some(node) = doc.get("columns") {
            if let Some(children) = node.children() {
                for child in children.nodes() {
                    let key: FieldKey = child.name().value().parse()?;
                    let titles = child
                        .entries()
                        .iter()
                        .filter_map(|e| e.value().as_string())
                        .map(str::to_string)
                        .collect();
                    config.columns.insert(key, titles);
                }
            }
        }

        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Load config from a KDL file.
    ///
    /// Returns an empty config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Other(format!("Failed to read {}: {}", path.display(), e)))?;

        let doc: KdlDocument = content.parse().map_err(|e| {
            Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e))
        })?;

        Self::from_kdl(&doc)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), strip_prefix(&e))))
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    /// Column overrides are merged per field.
    pub fn merge(&mut self, other: &SprintriskConfig) {
        if other.board_id.is_some() {
            self.board_id = other.board_id;
        }
        if other.page_limit.is_some() {
            self.page_limit = other.page_limit;
        }
        if other.api_url.is_some() {
            self.api_url = other.api_url.clone();
        }
        if other.llm_model.is_some() {
            self.llm_model = other.llm_model.clone();
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format.clone();
        }
        for (key, titles) in &other.columns {
            self.columns.insert(*key, titles.clone());
        }
    }
}

/// Message of a config error without the "Configuration error:" prefix.
fn strip_prefix(err: &Error) -> String {
    match err {
        Error::Config(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_integer_arg(node: &KdlNode) -> Option<i128> {
    node.entries().first().and_then(|e| e.value().as_integer())
}
