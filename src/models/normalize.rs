//! Field normalization for raw board items.
//!
//! Board columns arrive as `{id, text, value}` records where `text` is the
//! rendered label and `value` is a JSON-encoded payload whose shape depends on
//! the column type. This module turns them into a [`NormalizedItem`].
//!
//! Nothing here fails: malformed payloads read as "no value".

use super::{ItemContext, NormalizedItem, Role, TrackStatuses};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Accepted key names for the start bound of a timeline payload, in priority order.
pub const TIMELINE_START_KEYS: &[&str] = &["from", "startDate", "start_date"];

/// Accepted key names for the end bound of a timeline payload, in priority order.
pub const TIMELINE_END_KEYS: &[&str] = &["to", "endDate", "end_date"];

/// Keys holding the assignee list of a people payload, in priority order.
const PEOPLE_KEYS: &[&str] = &["personsAndTeams", "personsAndTeamsV2"];

/// Semantic board fields, resolved to board-specific column ids by title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKey {
    ProductStatus,
    DesignStatus,
    DevStatus,
    Priority,
    ProductOwner,
    Designer,
    Developer,
    Timeline,
    Progress,
    UseCase,
    Vertical,
    /// Status column used to flag items with missing owners
    RiskHighlight,
}

impl FieldKey {
    pub const ALL: [FieldKey; 12] = [
        FieldKey::ProductStatus,
        FieldKey::DesignStatus,
        FieldKey::DevStatus,
        FieldKey::Priority,
        FieldKey::ProductOwner,
        FieldKey::Designer,
        FieldKey::Developer,
        FieldKey::Timeline,
        FieldKey::Progress,
        FieldKey::UseCase,
        FieldKey::Vertical,
        FieldKey::RiskHighlight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::ProductStatus => "product-status",
            FieldKey::DesignStatus => "design-status",
            FieldKey::DevStatus => "dev-status",
            FieldKey::Priority => "priority",
            FieldKey::ProductOwner => "product-owner",
            FieldKey::Designer => "designer",
            FieldKey::Developer => "developer",
            FieldKey::Timeline => "timeline",
            FieldKey::Progress => "progress",
            FieldKey::UseCase => "use-case",
            FieldKey::Vertical => "vertical",
            FieldKey::RiskHighlight => "risk-highlight",
        }
    }

    /// Column titles matched (case-insensitively) when no override is configured.
    pub fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            FieldKey::ProductStatus => &["product status"],
            FieldKey::DesignStatus => &["design status"],
            FieldKey::DevStatus => &["dev status"],
            FieldKey::Priority => &["priority"],
            FieldKey::ProductOwner => &["product owner"],
            FieldKey::Designer => &["designer"],
            FieldKey::Developer => &["developer"],
            FieldKey::Timeline => &["timeline"],
            FieldKey::Progress => &["progress"],
            FieldKey::UseCase => &["use case"],
            FieldKey::Vertical => &["vertical"],
            FieldKey::RiskHighlight => &["risk highlight", "risk status", "data quality"],
        }
    }

    /// The people field that staffs a role.
    pub fn for_role(role: Role) -> FieldKey {
        match role {
            Role::ProductOwner => FieldKey::ProductOwner,
            Role::Designer => FieldKey::Designer,
            Role::Developer => FieldKey::Developer,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FieldKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown column key: {}", s)))
    }
}

/// Mapping from semantic field to board column id.
///
/// A field absent from the map is not configured on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnIds(BTreeMap<FieldKey, String>);

impl ColumnIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, column_id: impl Into<String>) {
        self.0.insert(key, column_id.into());
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn is_configured(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl FromIterator<(FieldKey, String)> for ColumnIds {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One column value record as returned by the board API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumnValue {
    pub id: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,

    /// Rendered label
    #[serde(default)]
    pub text: Option<String>,

    /// JSON-encoded structured payload
    #[serde(default)]
    pub value: Option<String>,
}

/// Group reference attached to each item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// A board item as returned by the board API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group: Option<GroupRef>,
    #[serde(default)]
    pub column_values: Vec<RawColumnValue>,
}

impl RawItem {
    /// Id of the group the item belongs to.
    pub fn group_id(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.id.as_str())
    }
}

/// Trim and lower-case a label; `None` becomes empty.
pub fn norm(text: Option<&str>) -> String {
    text.unwrap_or_default().trim().to_lowercase()
}

/// Parse assignee ids from a people column payload.
///
/// Any malformed or missing payload yields an empty list.
pub fn parse_people(value_json: Option<&str>) -> Vec<String> {
    let Some(raw) = value_json.filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    let Ok(parsed) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };

    let entries = PEOPLE_KEYS
        .iter()
        .filter_map(|key| parsed.get(key).and_then(Value::as_array))
        .find(|arr| !arr.is_empty());

    entries
        .map(|arr| {
            arr.iter()
                .filter_map(|p| p.get("id"))
                .filter_map(|id| match id {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a `YYYY-MM-DD` prefix (first 10 characters) into a date.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    let prefix: String = text.chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").ok()
}

/// Parse a timeline payload into `(start, end)`.
///
/// Each bound is looked up through its alias list and parsed on its own, so a
/// malformed start does not hide a valid end.
pub fn parse_timeline_value(value_json: Option<&str>) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Some(raw) = value_json.filter(|s| !s.is_empty()) else {
        return (None, None);
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return (None, None);
    };

    let bound = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| map.get(*k).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .and_then(parse_date_text)
    };

    (bound(TIMELINE_START_KEYS), bound(TIMELINE_END_KEYS))
}

/// Normalize a raw item using the resolved column mapping.
pub fn normalize_item(raw: &RawItem, columns: &ColumnIds) -> NormalizedItem {
    let by_id: HashMap<&str, &RawColumnValue> = raw
        .column_values
        .iter()
        .map(|cv| (cv.id.as_str(), cv))
        .collect();

    let column = |key: FieldKey| columns.get(key).and_then(|id| by_id.get(id).copied());
    let text = |key: FieldKey| norm(column(key).and_then(|cv| cv.text.as_deref()));
    let value = |key: FieldKey| column(key).and_then(|cv| cv.value.as_deref());
    let context_text = |key: FieldKey| {
        column(key)
            .and_then(|cv| cv.text.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let owners = Role::ALL
        .into_iter()
        .filter(|role| columns.is_configured(FieldKey::for_role(*role)))
        .map(|role| (role, parse_people(value(FieldKey::for_role(role)))))
        .collect();

    let (_, timeline_end) = parse_timeline_value(value(FieldKey::Timeline));

    NormalizedItem {
        id: raw.id.clone(),
        name: raw.name.clone(),
        statuses: TrackStatuses {
            product_status: text(FieldKey::ProductStatus),
            design_status: text(FieldKey::DesignStatus),
            dev_status: text(FieldKey::DevStatus),
        },
        owners,
        priority_text: text(FieldKey::Priority),
        timeline_end,
        context: ItemContext {
            progress: context_text(FieldKey::Progress),
            use_case: context_text(FieldKey::UseCase),
            vertical: context_text(FieldKey::Vertical),
        },
    }
}
