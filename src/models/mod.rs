//! Data models for sprint risk assessment.
//!
//! This module defines the core data structures:
//! - `NormalizedItem` - A board item with typed status, owner and timeline fields
//! - `RiskAssessment` - The ordered risk reasons derived from one item
//! - `SprintContext` - Sprint-wide counters and the timeline verdict
//!
//! Everything here is recomputed from scratch on every run; nothing is persisted.

pub mod normalize;
pub mod risk;
pub mod sprint;

pub use normalize::{ColumnIds, FieldKey, RawColumnValue, RawItem, normalize_item};
pub use risk::{RiskAssessment, RiskReason, assess_item};
pub use sprint::{LateItem, SprintContext, SprintStats, SprintTimeline, TimelineStatus};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Status texts recognized as "completed".
pub const DONE_STATUS_ALIASES: &[&str] = &["done", "complete", "released"];

/// Status texts recognized as "stuck".
pub const BLOCKED_ALIASES: &[&str] = &["blocked", "stuck"];

/// Returns true if a normalized status text means the track is complete.
pub fn is_done_status(status: &str) -> bool {
    DONE_STATUS_ALIASES.contains(&status)
}

/// Returns true if a normalized status text means the track is stuck.
pub fn is_blocked_status(status: &str) -> bool {
    BLOCKED_ALIASES.contains(&status)
}

/// One of the three parallel status dimensions tracked per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Product,
    Design,
    Dev,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Product, Track::Design, Track::Dev];

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Product => "product",
            Track::Design => "design",
            Track::Dev => "dev",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A people role that is expected to be staffed on every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ProductOwner,
    Designer,
    Developer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::ProductOwner, Role::Designer, Role::Developer];

    /// Display label used in risk reasons and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Role::ProductOwner => "Product owner",
            Role::Designer => "Designer",
            Role::Developer => "Developer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Normalized status text for each track.
///
/// Empty string means "no status", whether the column is missing from the
/// board or simply unset on this item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStatuses {
    pub product_status: String,
    pub design_status: String,
    pub dev_status: String,
}

impl TrackStatuses {
    /// Status for a single track.
    pub fn get(&self, track: Track) -> &str {
        match track {
            Track::Product => &self.product_status,
            Track::Design => &self.design_status,
            Track::Dev => &self.dev_status,
        }
    }

    /// All three statuses in track order.
    pub fn all(&self) -> [&str; 3] {
        [
            self.product_status.as_str(),
            self.design_status.as_str(),
            self.dev_status.as_str(),
        ]
    }

    /// Non-empty statuses in track order.
    pub fn present(&self) -> Vec<&str> {
        self.all().into_iter().filter(|s| !s.is_empty()).collect()
    }

    /// Tracks that are not complete, with their status text (possibly empty).
    pub fn open_tracks(&self) -> Vec<(Track, &str)> {
        Track::ALL
            .into_iter()
            .map(|t| (t, self.get(t)))
            .filter(|(_, s)| !is_done_status(s))
            .collect()
    }

    /// Returns true if any track is blocked.
    pub fn any_blocked(&self) -> bool {
        self.all().iter().any(|s| is_blocked_status(s))
    }
}

/// A tracked work item after field normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Board item identifier
    pub id: String,

    /// Item name as shown on the board
    pub name: String,

    #[serde(flatten)]
    pub statuses: TrackStatuses,

    /// Assignee ids per role.
    ///
    /// A role missing from the map is not tracked on this board, which is
    /// different from a tracked role with no assignees.
    #[serde(default)]
    pub owners: BTreeMap<Role, Vec<String>>,

    /// Lower-cased priority label, empty if unset
    #[serde(rename = "priority")]
    pub priority_text: String,

    /// Declared deadline (end bound of the timeline column)
    pub timeline_end: Option<NaiveDate>,

    /// Free-form context columns carried into the report
    #[serde(default, skip_serializing_if = "ItemContext::is_empty")]
    pub context: ItemContext,
}

impl NormalizedItem {
    /// Create an item with no field values.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns true if every present track status is a done-alias.
    ///
    /// An item with no track status at all is not done.
    pub fn done_all(&self) -> bool {
        let present = self.statuses.present();
        !present.is_empty() && present.iter().all(|s| is_done_status(s))
    }

    /// Returns true if the priority label reads as high priority.
    pub fn is_high_priority(&self) -> bool {
        self.priority_text.contains("high")
    }

    /// Whole days from `today` until the timeline end (negative once passed).
    pub fn days_until_end(&self, today: NaiveDate) -> Option<i64> {
        self.timeline_end.map(|end| (end - today).num_days())
    }
}

/// Optional descriptive columns (progress, use case, vertical).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
}

impl ItemContext {
    pub fn is_empty(&self) -> bool {
        self.progress.is_none() && self.use_case.is_none() && self.vertical.is_none()
    }
}
