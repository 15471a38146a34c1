//! Board access for sprint assessment.
//!
//! This module provides:
//! - [`BoardSource`]: anything that can produce a [`BoardSnapshot`] (the live
//!   monday.com API via [`MondayClient`], or a JSON file via [`SnapshotFile`])
//! - [`BoardSink`]: the write side used to flag items and post the summary
//! - Sprint group selection and summary-row filtering

pub mod client;
pub mod columns;
pub mod writer;

pub use client::MondayClient;
pub use columns::{ColumnAliases, resolve_columns};
pub use writer::{SummaryWrite, highlight_missing_fields, write_summary};

use crate::Result;
use crate::models::RawItem;
use crate::models::normalize::norm;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Names of summary rows start with this prefix (compared normalized).
pub const SUMMARY_ITEM_PREFIX: &str = "sprint summary";

/// Label written to the risk highlight column for items with unstaffed roles.
pub const MISSING_FIELDS_LABEL: &str = "Missing fields";

/// Errors from the board API transport.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Token is invalid or expired (401 Unauthorized)
    #[error("Invalid or expired token: board API returned 401 Unauthorized")]
    Unauthorized,

    /// Token lacks access to the board (403 Forbidden)
    #[error("Token lacks required permissions: board API returned 403 Forbidden")]
    Forbidden,

    /// Network or other HTTP error
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a GraphQL `errors` array
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Failed to parse response
    #[error("Failed to parse board response: {0}")]
    Parse(String),
}

/// A board column definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

/// A board group (one sprint per group).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardGroup {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Board metadata plus every item on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<BoardGroup>,
    #[serde(default)]
    pub columns: Vec<BoardColumn>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// Items of one sprint group, with summary rows split out.
#[derive(Debug, Clone)]
pub struct SprintGroupItems<'a> {
    pub group: &'a BoardGroup,
    /// Work items, in board order
    pub items: Vec<&'a RawItem>,
    /// Existing summary rows, in board order
    pub summary_items: Vec<&'a RawItem>,
}

impl BoardSnapshot {
    /// Select the group for sprint `number` and split its items.
    pub fn sprint_group(&self, number: u32) -> Result<SprintGroupItems<'_>> {
        let group = find_sprint_group(&self.groups, number).ok_or_else(|| {
            crate::Error::NotFound(format!(
                "No group starting with 'Sprint {}' found on board '{}'.",
                number, self.name
            ))
        })?;

        let (summary_items, items): (Vec<&RawItem>, Vec<&RawItem>) = self
            .items
            .iter()
            .filter(|i| i.group_id() == Some(group.id.as_str()))
            .partition(|i| is_summary_item(i));

        Ok(SprintGroupItems {
            group,
            items,
            summary_items,
        })
    }
}

/// Read access to a board.
pub trait BoardSource {
    /// Load board metadata and all items.
    fn load_board(&self) -> Result<BoardSnapshot>;
}

/// Write access to a board.
pub trait BoardSink {
    /// Set a status column to the given label.
    fn set_status_label(&self, item_id: &str, column_id: &str, label: &str) -> Result<()>;

    /// Rename an item.
    fn rename_item(&self, item_id: &str, name: &str) -> Result<()>;

    /// Create an item in a group, returning its id.
    fn create_item(&self, group_id: &str, name: &str) -> Result<String>;

    /// Post an update (note) on an item, returning the update id.
    fn create_update(&self, item_id: &str, body: &str) -> Result<String>;
}

/// A board snapshot stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BoardSource for SnapshotFile {
    fn load_board(&self) -> Result<BoardSnapshot> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            crate::Error::Other(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let snapshot: BoardSnapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            "loaded board snapshot"
        );
        Ok(snapshot)
    }
}

/// First group whose title starts with `sprint <number>`.
///
/// The number must not continue with another digit, so sprint 1 does not
/// select "Sprint 12".
pub fn find_sprint_group(groups: &[BoardGroup], number: u32) -> Option<&BoardGroup> {
    let prefix = format!("sprint {}", number);
    groups.iter().find(|g| {
        let title = norm(Some(g.title.as_str()));
        title
            .strip_prefix(&prefix)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
    })
}

/// Returns true for rows holding a previously posted sprint summary.
pub fn is_summary_item(item: &RawItem) -> bool {
    norm(Some(item.name.as_str())).starts_with(SUMMARY_ITEM_PREFIX)
}

/// Name of the dated summary row.
pub fn summary_item_name(today: NaiveDate) -> String {
    format!("Sprint Summary - {}", today.format("%Y-%m-%d"))
}
