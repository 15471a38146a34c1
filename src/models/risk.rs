//! Risk rules for a single sprint item.
//!
//! Each rule is an independent predicate over a [`NormalizedItem`] that adds at
//! most one reason. Rules run in a fixed order so the reason list (and any
//! report built from it) is deterministic:
//!
//! 1. **Blocked**: any track is blocked or stuck
//! 2. **Missing owners**: product owner, designer, developer (in that order),
//!    only for roles tracked on the board
//! 3. **Overdue**: timeline end has passed and the item is not done
//! 4. **Near due**: timeline end is at most three days away and the item is not done
//! 5. **High priority near due**: as above, for high priority items
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use sprintrisk::models::{NormalizedItem, assess_item};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
//! let mut item = NormalizedItem::new("1", "Checkout");
//! item.statuses.dev_status = "stuck".to_string();
//!
//! let assessment = assess_item(&item, today);
//! assert!(assessment.risky);
//! assert_eq!(assessment.reason_texts(), vec!["blocked/stuck in one or more tracks"]);
//! ```

use super::{NormalizedItem, Role};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// Rule thresholds.
pub mod thresholds {
    /// An item is "near due" when its end date is at most this many days away.
    pub const NEAR_DUE_DAYS: i64 = 3;
}

/// A triggered risk rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskReason {
    Blocked,
    MissingRole(Role),
    Overdue,
    NearDue,
    HighPriorityNearDue,
}

impl RiskReason {
    pub fn message(&self) -> &'static str {
        match self {
            RiskReason::Blocked => "blocked/stuck in one or more tracks",
            RiskReason::MissingRole(Role::ProductOwner) => "missing Product owner",
            RiskReason::MissingRole(Role::Designer) => "missing Designer",
            RiskReason::MissingRole(Role::Developer) => "missing Developer",
            RiskReason::Overdue => "timeline end passed",
            RiskReason::NearDue => "near due (≤3 days) and not done",
            RiskReason::HighPriorityNearDue => "high priority near due and not done",
        }
    }

    /// Returns true for reasons that point at an unstaffed role.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, RiskReason::MissingRole(_))
    }
}

impl fmt::Display for RiskReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for RiskReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Risk verdict for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    #[serde(flatten)]
    pub item: NormalizedItem,

    /// Triggered rules in rule order
    pub reasons: Vec<RiskReason>,

    /// True iff at least one rule triggered
    pub risky: bool,
}

impl RiskAssessment {
    /// Build an assessment, deriving `risky` from the reasons.
    pub fn new(item: NormalizedItem, reasons: Vec<RiskReason>) -> Self {
        let risky = !reasons.is_empty();
        Self {
            item,
            reasons,
            risky,
        }
    }

    /// Returns true if any reason is a missing owner.
    pub fn has_missing_fields(&self) -> bool {
        self.reasons.iter().any(RiskReason::is_missing_field)
    }

    /// Reason messages in rule order.
    pub fn reason_texts(&self) -> Vec<&'static str> {
        self.reasons.iter().map(RiskReason::message).collect()
    }
}

/// Evaluate every risk rule against one item.
///
/// `today` is passed in rather than read from the clock so the result depends
/// only on the arguments.
pub fn assess_item(item: &NormalizedItem, today: NaiveDate) -> RiskAssessment {
    let mut reasons = Vec::new();

    check_blocked(item, &mut reasons);
    for role in Role::ALL {
        check_missing_role(item, role, &mut reasons);
    }
    check_overdue(item, today, &mut reasons);
    check_near_due(item, today, &mut reasons);
    check_high_priority_near_due(item, today, &mut reasons);

    RiskAssessment::new(item.clone(), reasons)
}

fn check_blocked(item: &NormalizedItem, reasons: &mut Vec<RiskReason>) {
    if item.statuses.any_blocked() {
        reasons.push(RiskReason::Blocked);
    }
}

/// Roles not tracked on the board never produce a reason.
fn check_missing_role(item: &NormalizedItem, role: Role, reasons: &mut Vec<RiskReason>) {
    if item.owners.get(&role).is_some_and(Vec::is_empty) {
        reasons.push(RiskReason::MissingRole(role));
    }
}

fn check_overdue(item: &NormalizedItem, today: NaiveDate, reasons: &mut Vec<RiskReason>) {
    let passed = item.timeline_end.is_some_and(|end| end < today);
    if passed && !item.done_all() {
        reasons.push(RiskReason::Overdue);
    }
}

fn check_near_due(item: &NormalizedItem, today: NaiveDate, reasons: &mut Vec<RiskReason>) {
    if is_near_due(item, today) && !item.done_all() {
        reasons.push(RiskReason::NearDue);
    }
}

fn check_high_priority_near_due(
    item: &NormalizedItem,
    today: NaiveDate,
    reasons: &mut Vec<RiskReason>,
) {
    if item.is_high_priority() && is_near_due(item, today) && !item.done_all() {
        reasons.push(RiskReason::HighPriorityNearDue);
    }
}

/// No lower bound: an overdue item is also near due.
fn is_near_due(item: &NormalizedItem, today: NaiveDate) -> bool {
    item.days_until_end(today)
        .is_some_and(|days| days <= thresholds::NEAR_DUE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackStatuses;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 11, 20)
    }

    fn staffed(id: &str) -> NormalizedItem {
        let mut item = NormalizedItem::new(id, format!("Item {}", id));
        for role in Role::ALL {
            item.owners.insert(role, vec!["u1".to_string()]);
        }
        item
    }

    fn all_done() -> TrackStatuses {
        TrackStatuses {
            product_status: "done".to_string(),
            design_status: "done".to_string(),
            dev_status: "done".to_string(),
        }
    }

    // ==================== Blocked Tests ====================

    #[test]
    fn test_blocked_in_any_track() {
        let mut item = NormalizedItem::new("a", "A");
        item.statuses.dev_status = "stuck".to_string();

        let result = assess_item(&item, today());
        assert_eq!(result.reason_texts(), vec!["blocked/stuck in one or more tracks"]);
        assert!(result.risky);
    }

    #[test]
    fn test_blocked_and_done_tracks_mix() {
        let mut item = staffed("a");
        item.statuses = all_done();
        item.statuses.design_status = "blocked".to_string();

        let result = assess_item(&item, today());
        assert_eq!(result.reasons, vec![RiskReason::Blocked]);
    }

    // ==================== Missing Role Tests ====================

    #[test]
    fn test_missing_roles_in_declaration_order() {
        let mut item = NormalizedItem::new("a", "A");
        item.owners.insert(Role::Developer, vec![]);
        item.owners.insert(Role::ProductOwner, vec![]);
        item.owners.insert(Role::Designer, vec!["7".to_string()]);

        let result = assess_item(&item, today());
        assert_eq!(
            result.reason_texts(),
            vec!["missing Product owner", "missing Developer"]
        );
        assert!(result.has_missing_fields());
    }

    #[test]
    fn test_untracked_roles_never_missing() {
        let item = NormalizedItem::new("a", "A");
        let result = assess_item(&item, today());
        assert!(result.reasons.is_empty());
        assert!(!result.risky);
        assert!(!result.has_missing_fields());
    }

    // ==================== Timeline Tests ====================

    #[test]
    fn test_done_item_past_deadline_is_not_risky() {
        let mut item = staffed("b");
        item.statuses = all_done();
        item.timeline_end = Some(date(2025, 11, 15));

        let result = assess_item(&item, today());
        assert!(item.done_all());
        assert!(result.reasons.is_empty());
        assert!(!result.risky);
    }

    #[test]
    fn test_overdue_also_counts_as_near_due() {
        let mut item = staffed("a");
        item.statuses.dev_status = "working on it".to_string();
        item.timeline_end = Some(date(2025, 11, 10));

        let result = assess_item(&item, today());
        assert_eq!(
            result.reasons,
            vec![RiskReason::Overdue, RiskReason::NearDue]
        );
    }

    #[test]
    fn test_partially_done_item_is_not_done() {
        let mut item = staffed("a");
        item.statuses = all_done();
        item.statuses.design_status = "working on it".to_string();
        item.timeline_end = Some(date(2025, 11, 19));

        let result = assess_item(&item, today());
        assert_eq!(result.reasons, vec![RiskReason::Overdue, RiskReason::NearDue]);
    }

    #[test]
    fn test_due_today_is_near_due_not_overdue() {
        let mut item = staffed("a");
        item.timeline_end = Some(today());

        let result = assess_item(&item, today());
        assert_eq!(result.reasons, vec![RiskReason::NearDue]);
    }

    #[test]
    fn test_near_due_window_is_inclusive() {
        let mut item = staffed("a");
        item.timeline_end = Some(date(2025, 11, 23));
        assert_eq!(assess_item(&item, today()).reasons, vec![RiskReason::NearDue]);

        item.timeline_end = Some(date(2025, 11, 24));
        assert!(assess_item(&item, today()).reasons.is_empty());
    }

    #[test]
    fn test_high_priority_near_due_with_empty_statuses() {
        let mut item = NormalizedItem::new("c", "C");
        item.priority_text = "high".to_string();
        item.timeline_end = Some(date(2025, 11, 22));

        let result = assess_item(&item, today());
        assert_eq!(
            result.reason_texts(),
            vec![
                "near due (≤3 days) and not done",
                "high priority near due and not done"
            ]
        );
        assert!(result.risky);
    }

    #[test]
    fn test_high_priority_without_deadline_is_not_risky() {
        let mut item = staffed("a");
        item.priority_text = "high".to_string();
        assert!(!assess_item(&item, today()).risky);
    }

    #[test]
    fn test_all_rules_fire_in_fixed_order() {
        let mut item = NormalizedItem::new("x", "X");
        for role in Role::ALL {
            item.owners.insert(role, vec![]);
        }
        item.statuses.product_status = "blocked".to_string();
        item.priority_text = "high".to_string();
        item.timeline_end = Some(date(2025, 11, 1));

        let result = assess_item(&item, today());
        assert_eq!(
            result.reasons,
            vec![
                RiskReason::Blocked,
                RiskReason::MissingRole(Role::ProductOwner),
                RiskReason::MissingRole(Role::Designer),
                RiskReason::MissingRole(Role::Developer),
                RiskReason::Overdue,
                RiskReason::NearDue,
                RiskReason::HighPriorityNearDue,
            ]
        );
    }

    #[test]
    fn test_risky_matches_reasons() {
        let items = [
            NormalizedItem::new("1", "plain"),
            {
                let mut i = NormalizedItem::new("2", "stuck");
                i.statuses.product_status = "stuck".to_string();
                i
            },
        ];
        for item in &items {
            let result = assess_item(item, today());
            assert_eq!(result.risky, !result.reasons.is_empty());
        }
    }

    #[test]
    fn test_assessment_serializes_reason_strings() {
        let mut item = NormalizedItem::new("a", "A");
        item.statuses.dev_status = "stuck".to_string();
        let json = serde_json::to_value(assess_item(&item, today())).unwrap();

        assert_eq!(json["id"], "a");
        assert_eq!(json["dev_status"], "stuck");
        assert_eq!(json["reasons"][0], "blocked/stuck in one or more tracks");
        assert_eq!(json["risky"], true);
    }
}
