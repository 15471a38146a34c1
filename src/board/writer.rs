//! Write-back of assessment results to the board.

use super::{BoardSink, MISSING_FIELDS_LABEL};
use crate::Result;
use crate::models::{ColumnIds, FieldKey, RawItem, RiskAssessment};
use serde::Serialize;

/// Outcome of posting the sprint summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryWrite {
    pub item_id: String,
    pub item_name: String,
    /// False when an existing summary row was renamed and reused
    pub created: bool,
    pub update_id: String,
}

/// Flag every item with an unstaffed role in the risk highlight column.
///
/// Returns the ids of the flagged items. Does nothing if the board has no
/// risk highlight column.
pub fn highlight_missing_fields(
    sink: &dyn BoardSink,
    columns: &ColumnIds,
    assessments: &[RiskAssessment],
) -> Result<Vec<String>> {
    let Some(column_id) = columns.get(FieldKey::RiskHighlight) else {
        tracing::info!("no risk highlight column on board; skipping missing-field flags");
        return Ok(Vec::new());
    };

    let mut flagged = Vec::new();
    for assessment in assessments.iter().filter(|a| a.has_missing_fields()) {
        sink.set_status_label(&assessment.item.id, column_id, MISSING_FIELDS_LABEL)?;
        flagged.push(assessment.item.id.clone());
    }
    tracing::info!(count = flagged.len(), "flagged items with missing fields");
    Ok(flagged)
}

/// Post the summary text on the group's summary row.
///
/// The first existing summary row is renamed to `item_name` and reused;
/// otherwise a new row is created in the group.
pub fn write_summary(
    sink: &dyn BoardSink,
    group_id: &str,
    existing: Option<&RawItem>,
    item_name: &str,
    text: &str,
) -> Result<SummaryWrite> {
    let (item_id, created) = match existing {
        Some(item) => {
            sink.rename_item(&item.id, item_name)?;
            (item.id.clone(), false)
        }
        None => (sink.create_item(group_id, item_name)?, true),
    };

    let update_id = sink.create_update(&item_id, text)?;
    tracing::info!(item = %item_id, update = %update_id, created, "posted sprint summary");

    Ok(SummaryWrite {
        item_id,
        item_name: item_name.to_string(),
        created,
        update_id,
    })
}
