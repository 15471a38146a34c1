//! `columns` and `snapshot`: inspect the board itself.

use super::{Output, monday_client};
use crate::Result;
use crate::board::{BoardSnapshot, BoardSource, ColumnAliases, SnapshotFile, resolve_columns};
use crate::config::ResolvedConfig;
use crate::models::FieldKey;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How one semantic field maps onto the board.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMapping {
    pub field: FieldKey,
    pub column_id: Option<String>,
    pub column_title: Option<String>,
    /// Titles that were accepted for this field
    pub aliases: Vec<String>,
}

/// Result of `sprintrisk columns`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnsResult {
    pub board: String,
    pub mappings: Vec<ColumnMapping>,
}

impl Output for ColumnsResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Columns on board '{}':", self.board)];
        for m in &self.mappings {
            let target = match (&m.column_id, &m.column_title) {
                (Some(id), Some(title)) => format!("{} ({})", title, id),
                (Some(id), None) => id.clone(),
                _ => format!("not found (tried: {})", m.aliases.join(", ")),
            };
            lines.push(format!("  {:<16} {}", m.field.as_str(), target));
        }
        lines.join("\n")
    }
}

/// Show how every semantic field resolves against the board's columns.
pub fn columns(config: &ResolvedConfig, input: Option<&Path>) -> Result<ColumnsResult> {
    let snapshot = match input {
        Some(path) => SnapshotFile::new(path).load_board()?,
        None => monday_client(config)?.load_board()?,
    };
    Ok(column_mappings(&snapshot, &config.columns))
}

fn column_mappings(snapshot: &BoardSnapshot, aliases: &ColumnAliases) -> ColumnsResult {
    let resolved = resolve_columns(&snapshot.columns, aliases);
    let mappings = FieldKey::ALL
        .into_iter()
        .map(|field| {
            let column_id = resolved.get(field).map(str::to_string);
            let column_title = column_id.as_deref().and_then(|id| {
                snapshot
                    .columns
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.title.clone())
            });
            ColumnMapping {
                field,
                column_id,
                column_title,
                aliases: aliases.titles(field).to_vec(),
            }
        })
        .collect();

    ColumnsResult {
        board: snapshot.name.clone(),
        mappings,
    }
}

/// Result of `sprintrisk snapshot`.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResult {
    pub path: PathBuf,
    pub board: String,
    pub groups: usize,
    pub items: usize,
}

impl Output for SnapshotResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        format!(
            "Saved board '{}' ({} groups, {} items) to {}",
            self.board,
            self.groups,
            self.items,
            self.path.display()
        )
    }
}

/// Fetch the live board and save it for offline `assess` and `columns` runs.
pub fn snapshot(config: &ResolvedConfig, output: &Path) -> Result<SnapshotResult> {
    let board = monday_client(config)?.load_board()?;
    save_snapshot(&board, output)
}

fn save_snapshot(board: &BoardSnapshot, output: &Path) -> Result<SnapshotResult> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, serde_json::to_string_pretty(board)?)?;
    tracing::info!(path = %output.display(), items = board.items.len(), "saved board snapshot");

    Ok(SnapshotResult {
        path: output.to_path_buf(),
        board: board.name.clone(),
        groups: board.groups.len(),
        items: board.items.len(),
    })
}
