//! Command implementations for the Sprintrisk CLI.
//!
//! This module contains the business logic for each CLI command:
//! - `sprint` - `run` and `assess`
//! - `board` - `columns` and `snapshot`
//! - `config` - `config show` and `config path`
//!
//! Every command returns a result type implementing [`Output`] so `main`
//! can print it as JSON or human-readable text.

mod board;
mod config;
mod sprint;

pub use board::{ColumnMapping, ColumnsResult, SnapshotResult, columns, snapshot};
pub use config::{ConfigPathResult, ConfigShowResult, config_path, config_show};
pub use sprint::{AssessResult, RunOptions, RunResult, assess, run, run_with};

use crate::board::{BoardSnapshot, ColumnAliases, MondayClient, resolve_columns};
use crate::config::ResolvedConfig;
use crate::models::{ColumnIds, RawItem, RiskAssessment, SprintContext, assess_item, normalize_item};
use crate::report::{OpenAiRenderer, ReportRenderer, TemplateRenderer};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::{BufRead, Write};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Prompt shown when no sprint number was passed.
pub const SPRINT_PROMPT: &str = "Enter Sprint number (e.g., 4): ";

/// Sprint number from the flag, or read from `input` after prompting on `prompt_out`.
pub fn resolve_sprint_number<R: BufRead, W: Write>(
    flag: Option<u32>,
    input: &mut R,
    prompt_out: &mut W,
) -> Result<u32> {
    if let Some(n) = flag {
        return Ok(n);
    }

    write!(prompt_out, "{}", SPRINT_PROMPT)?;
    prompt_out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_sprint_number(&line)
}

/// Parse a sprint number typed by the user.
pub fn parse_sprint_number(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("no sprint number given".to_string()));
    }
    trimmed.parse::<u32>().map_err(|_| {
        Error::InvalidInput(format!(
            "sprint number must be a non-negative integer, got '{}'",
            trimmed
        ))
    })
}

/// The evaluation date: the `--today` flag or the local calendar date.
pub fn effective_today(flag: Option<NaiveDate>) -> NaiveDate {
    flag.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Everything computed for one sprint group before any write-back.
#[derive(Debug, Clone)]
pub struct SprintAssessment {
    pub board_name: String,
    pub group_id: String,
    pub group_title: String,
    pub columns: ColumnIds,
    pub assessments: Vec<RiskAssessment>,
    pub context: SprintContext,
    /// First existing summary row in the group, reused on write
    pub summary_item: Option<RawItem>,
}

/// Select the sprint group, normalize and assess its items, and aggregate.
///
/// An empty group is an error rather than an empty report.
pub fn assess_sprint(
    snapshot: &BoardSnapshot,
    aliases: &ColumnAliases,
    number: u32,
    today: NaiveDate,
) -> Result<SprintAssessment> {
    let sprint = snapshot.sprint_group(number)?;
    if sprint.items.is_empty() {
        return Err(Error::EmptySprint(sprint.group.title.clone()));
    }

    let columns = resolve_columns(&snapshot.columns, aliases);
    let assessments: Vec<RiskAssessment> = sprint
        .items
        .iter()
        .map(|raw| assess_item(&normalize_item(raw, &columns), today))
        .collect();

    let context = SprintContext::build(sprint.group.title.clone(), &assessments, today);
    tracing::info!(
        group = %sprint.group.title,
        items = context.stats.total_items,
        risky = context.stats.risky_items,
        status = %context.timeline.status,
        "assessed sprint"
    );

    Ok(SprintAssessment {
        board_name: snapshot.name.clone(),
        group_id: sprint.group.id.clone(),
        group_title: sprint.group.title.clone(),
        columns,
        assessments,
        context,
        summary_item: sprint.summary_items.first().map(|i| (*i).clone()),
    })
}

/// Live board client built from the resolved config.
pub fn monday_client(config: &ResolvedConfig) -> Result<MondayClient> {
    let board_id = config.require_board_id()?;
    let token = config.require_monday_token()?;
    Ok(MondayClient::new(
        config.api_url.value.clone(),
        token,
        board_id,
        config.page_limit.value,
    ))
}

/// The LLM renderer when a key is available and allowed, else the template.
pub fn select_renderer(config: &ResolvedConfig, no_llm: bool) -> Box<dyn ReportRenderer> {
    match config.openai_key() {
        Some(key) if !no_llm => Box::new(OpenAiRenderer::new(key, config.llm_model.value.clone())),
        _ => Box::new(TemplateRenderer),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::board::{BoardColumn, BoardGroup};
    use crate::models::normalize::GroupRef;
    use crate::models::{RawColumnValue, TimelineStatus};
    use std::io::Cursor;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn column(id: &str, title: &str) -> BoardColumn {
        BoardColumn {
            id: id.to_string(),
            title: title.to_string(),
            column_type: None,
        }
    }

    fn value(id: &str, text: &str, value: Option<&str>) -> RawColumnValue {
        RawColumnValue {
            id: id.to_string(),
            column_type: None,
            text: Some(text.to_string()),
            value: value.map(str::to_string),
        }
    }

    fn item(id: &str, name: &str, group: &str, values: Vec<RawColumnValue>) -> RawItem {
        RawItem {
            id: id.to_string(),
            name: name.to_string(),
            group: Some(GroupRef {
                id: group.to_string(),
                title: String::new(),
            }),
            column_values: values,
        }
    }

    fn timeline(to: &str) -> String {
        format!(r#"{{"from":"2025-11-01","to":"{}"}}"#, to)
    }

    fn people(ids: &[u64]) -> String {
        let entries: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"id":{},"kind":"person"}}"#, id))
            .collect();
        format!(r#"{{"personsAndTeams":[{}]}}"#, entries.join(","))
    }

    /// Sprint 4 with a done item, a stuck overdue item, a high priority item
    /// due tomorrow with no developer, and an old summary row.
    pub(crate) fn sample_snapshot() -> BoardSnapshot {
        let dev = people(&[7]);
        BoardSnapshot {
            id: "18327136960".to_string(),
            name: "Roadmap".to_string(),
            groups: vec![
                BoardGroup {
                    id: "g3".to_string(),
                    title: "Sprint 3".to_string(),
                },
                BoardGroup {
                    id: "g4".to_string(),
                    title: "Sprint 4 (Nov 3 - Nov 21)".to_string(),
                },
                BoardGroup {
                    id: "g5".to_string(),
                    title: "Sprint 5".to_string(),
                },
            ],
            columns: vec![
                column("status", "Dev Status"),
                column("status_1", "Design Status"),
                column("status_2", "Product Status"),
                column("priority", "Priority"),
                column("people", "Developer"),
                column("timeline", "Timeline"),
                column("risk", "Risk Highlight"),
            ],
            items: vec![
                item(
                    "101",
                    "Checkout revamp",
                    "g4",
                    vec![
                        value("status", "Done", None),
                        value("status_1", "Done", None),
                        value("status_2", "Released", None),
                        value("people", "Dana", Some(&dev)),
                        value("timeline", "", Some(&timeline("2025-11-19"))),
                    ],
                ),
                item(
                    "102",
                    "Search filters",
                    "g4",
                    vec![
                        value("status", "Stuck", None),
                        value("people", "Dana", Some(&dev)),
                        value("timeline", "", Some(&timeline("2025-11-18"))),
                    ],
                ),
                item(
                    "103",
                    "Billing export",
                    "g4",
                    vec![
                        value("status", "Working on it", None),
                        value("priority", "High", None),
                        value("people", "", Some(r#"{"personsAndTeams":[]}"#)),
                        value("timeline", "", Some(&timeline("2025-11-21"))),
                    ],
                ),
                item("104", "Sprint Summary - 2025-11-13", "g4", Vec::new()),
                item("201", "Other sprint work", "g3", Vec::new()),
            ],
        }
    }

    // ==================== Sprint Number Tests ====================

    #[test]
    fn test_sprint_number_from_flag_skips_prompt() {
        let mut input = Cursor::new(Vec::new());
        let mut out = Vec::new();
        assert_eq!(resolve_sprint_number(Some(4), &mut input, &mut out).unwrap(), 4);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sprint_number_prompts_and_reads_line() {
        let mut input = Cursor::new(b" 7 \n".to_vec());
        let mut out = Vec::new();
        assert_eq!(resolve_sprint_number(None, &mut input, &mut out).unwrap(), 7);
        assert_eq!(String::from_utf8(out).unwrap(), SPRINT_PROMPT);
    }

    #[test]
    fn test_sprint_number_rejects_garbage() {
        assert!(matches!(parse_sprint_number("four"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_sprint_number("-1"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_sprint_number("\n"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_effective_today_prefers_flag() {
        assert_eq!(effective_today(Some(date(2025, 11, 20))), date(2025, 11, 20));
    }

    // ==================== assess_sprint Tests ====================

    #[test]
    fn test_assess_sprint_builds_context() {
        let snapshot = sample_snapshot();
        let result =
            assess_sprint(&snapshot, &ColumnAliases::default(), 4, date(2025, 11, 20)).unwrap();

        assert_eq!(result.group_id, "g4");
        assert_eq!(result.board_name, "Roadmap");
        assert_eq!(result.assessments.len(), 3);
        assert_eq!(result.summary_item.as_ref().map(|i| i.id.as_str()), Some("104"));

        let stats = &result.context.stats;
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.done_items, 1);
        assert_eq!(stats.blocked_items, 1);
        assert_eq!(stats.high_priority, 1);
        assert_eq!(stats.risky_items, 2);

        assert_eq!(result.context.timeline.sprint_end, Some(date(2025, 11, 21)));
        assert_eq!(result.context.timeline.status, TimelineStatus::Ongoing);
        let late: Vec<&str> = result
            .context
            .timeline
            .late_items
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(late, vec!["102"]);
    }

    #[test]
    fn test_assess_sprint_flags_missing_developer() {
        let snapshot = sample_snapshot();
        let result =
            assess_sprint(&snapshot, &ColumnAliases::default(), 4, date(2025, 11, 20)).unwrap();
        let billing = result
            .assessments
            .iter()
            .find(|a| a.item.id == "103")
            .unwrap();
        assert!(billing.has_missing_fields());
        assert!(billing.reason_texts().contains(&"missing Developer"));
    }

    #[test]
    fn test_assess_sprint_empty_group() {
        let snapshot = sample_snapshot();
        let err = assess_sprint(&snapshot, &ColumnAliases::default(), 5, date(2025, 11, 20))
            .unwrap_err();
        assert!(matches!(err, Error::EmptySprint(ref g) if g == "Sprint 5"));
    }

    #[test]
    fn test_assess_sprint_unknown_group() {
        let snapshot = sample_snapshot();
        let err = assess_sprint(&snapshot, &ColumnAliases::default(), 9, date(2025, 11, 20))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_select_renderer_without_key_uses_template() {
        let config = ResolvedConfig::default();
        assert_eq!(select_renderer(&config, false).name(), "template");
    }

    #[test]
    fn test_select_renderer_no_llm_overrides_key() {
        let config = ResolvedConfig {
            openai_key: Some(crate::config::Resolved::new(
                "sk-test".to_string(),
                crate::config::ValueSource::EnvVar("OPENAI_API_KEY".to_string()),
            )),
            ..Default::default()
        };
        assert_eq!(select_renderer(&config, true).name(), "template");
        assert_eq!(select_renderer(&config, false).name(), "openai");
    }
}
