//! Sprint-wide aggregation and timeline verdict.
//!
//! Given every assessed item of a sprint group, derive the counters, the
//! inferred sprint end (latest item deadline), the timeline status and the
//! items that missed their own deadline.

use super::RiskAssessment;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Number of risky items surfaced in `top_risks`.
pub const TOP_RISKS_LIMIT: usize = 10;

/// Sprint-level timeline verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    /// No item declares a deadline
    Unknown,
    /// Today is before the sprint end
    Ongoing,
    /// Sprint end reached with every item done
    Met,
    /// Sprint end reached with open items
    Missed,
}

impl TimelineStatus {
    /// Derive the verdict from the sprint end and completion counts.
    pub fn derive(
        sprint_end: Option<NaiveDate>,
        today: NaiveDate,
        done_items: usize,
        total_items: usize,
    ) -> Self {
        match sprint_end {
            None => TimelineStatus::Unknown,
            Some(end) if today < end => TimelineStatus::Ongoing,
            Some(_) if total_items > 0 && done_items == total_items => TimelineStatus::Met,
            Some(_) => TimelineStatus::Missed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineStatus::Unknown => "unknown",
            TimelineStatus::Ongoing => "ongoing",
            TimelineStatus::Met => "met",
            TimelineStatus::Missed => "missed",
        }
    }
}

impl fmt::Display for TimelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sprint counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SprintStats {
    pub total_items: usize,
    pub risky_items: usize,
    pub done_items: usize,
    pub blocked_items: usize,
    pub high_priority: usize,
}

/// An item whose own deadline passed while it was still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LateItem {
    pub id: String,
    pub name: String,
    pub timeline_end: NaiveDate,
    pub product_status: String,
    pub design_status: String,
    pub dev_status: String,
}

/// Timeline block of the sprint context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintTimeline {
    pub sprint_end: Option<NaiveDate>,
    pub status: TimelineStatus,
    pub late_items: Vec<LateItem>,
}

/// Everything the report renderer needs to describe one sprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintContext {
    pub sprint_group: String,
    /// Date the context was computed for
    pub as_of: NaiveDate,
    pub stats: SprintStats,
    pub top_risks: Vec<RiskAssessment>,
    pub timeline: SprintTimeline,
}

impl SprintContext {
    /// Aggregate assessed items into the sprint context.
    ///
    /// Callers reject empty sprint groups before getting here; with no items
    /// the status is never `met`.
    pub fn build(sprint_group: impl Into<String>, assessed: &[RiskAssessment], today: NaiveDate) -> Self {
        let total_items = assessed.len();
        let done_items = assessed.iter().filter(|a| a.item.done_all()).count();
        let blocked_items = assessed
            .iter()
            .filter(|a| a.item.statuses.any_blocked())
            .count();
        let high_priority = assessed
            .iter()
            .filter(|a| a.item.is_high_priority())
            .count();

        let risky: Vec<&RiskAssessment> = assessed.iter().filter(|a| a.risky).collect();

        let sprint_end = infer_sprint_end(assessed);
        let status = TimelineStatus::derive(sprint_end, today, done_items, total_items);

        Self {
            sprint_group: sprint_group.into(),
            as_of: today,
            stats: SprintStats {
                total_items,
                risky_items: risky.len(),
                done_items,
                blocked_items,
                high_priority,
            },
            top_risks: risky.into_iter().take(TOP_RISKS_LIMIT).cloned().collect(),
            timeline: SprintTimeline {
                sprint_end,
                status,
                late_items: late_items(assessed, today),
            },
        }
    }
}

/// Latest deadline across items, if any item has one.
pub fn infer_sprint_end(assessed: &[RiskAssessment]) -> Option<NaiveDate> {
    assessed.iter().filter_map(|a| a.item.timeline_end).max()
}

/// Items past their own deadline and not done, independent of the sprint verdict.
pub fn late_items(assessed: &[RiskAssessment], today: NaiveDate) -> Vec<LateItem> {
    assessed
        .iter()
        .filter_map(|a| {
            let end = a.item.timeline_end?;
            if end >= today || a.item.done_all() {
                return None;
            }
            Some(LateItem {
                id: a.item.id.clone(),
                name: a.item.name.clone(),
                timeline_end: end,
                product_status: a.item.statuses.product_status.clone(),
                design_status: a.item.statuses.design_status.clone(),
                dev_status: a.item.statuses.dev_status.clone(),
            })
        })
        .collect()
}
