//! Resolve semantic fields to board column ids by column title.

use super::BoardColumn;
use crate::models::normalize::norm;
use crate::models::{ColumnIds, FieldKey};
use std::collections::BTreeMap;

/// Accepted column titles per semantic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases(BTreeMap<FieldKey, Vec<String>>);

impl Default for ColumnAliases {
    fn default() -> Self {
        Self(
            FieldKey::ALL
                .into_iter()
                .map(|key| {
                    let titles = key.default_aliases().iter().map(|t| t.to_string()).collect();
                    (key, titles)
                })
                .collect(),
        )
    }
}

impl ColumnAliases {
    /// Replace the accepted titles for one field.
    pub fn set(&mut self, key: FieldKey, titles: Vec<String>) {
        self.0.insert(key, titles);
    }

    /// Apply a set of overrides on top of the current aliases.
    pub fn with_overrides(mut self, overrides: &BTreeMap<FieldKey, Vec<String>>) -> Self {
        for (key, titles) in overrides {
            self.set(*key, titles.clone());
        }
        self
    }

    pub fn titles(&self, key: FieldKey) -> &[String] {
        self.0.get(&key).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Id of the first column (in board order) whose title matches any alias.
pub fn find_column_id_by_titles<'a>(columns: &'a [BoardColumn], titles: &[String]) -> Option<&'a str> {
    let wanted: Vec<String> = titles.iter().map(|t| t.trim().to_lowercase()).collect();
    columns
        .iter()
        .find(|c| wanted.contains(&norm(Some(c.title.as_str()))))
        .map(|c| c.id.as_str())
}

/// Resolve every semantic field against the board's columns.
///
/// Fields with no matching column are left out of the mapping.
pub fn resolve_columns(columns: &[BoardColumn], aliases: &ColumnAliases) -> ColumnIds {
    let resolved: ColumnIds = FieldKey::ALL
        .into_iter()
        .filter_map(|key| {
            find_column_id_by_titles(columns, aliases.titles(key)).map(|id| (key, id.to_string()))
        })
        .collect();

    for key in FieldKey::ALL {
        if !resolved.is_configured(key) {
            tracing::debug!(field = %key, "no board column matches field");
        }
    }

    resolved
}
