//! `run` and `assess`: evaluate one sprint group.

use super::{Output, assess_sprint, effective_today, monday_client, resolve_sprint_number, select_renderer};
use crate::Result;
use crate::board::{
    BoardSink, BoardSource, ColumnAliases, SnapshotFile, SummaryWrite, highlight_missing_fields,
    summary_item_name, write_summary,
};
use crate::cli::SprintArgs;
use crate::config::ResolvedConfig;
use crate::models::{RiskAssessment, SprintContext, SprintStats, TimelineStatus};
use crate::report::{ReportRenderer, TemplateRenderer};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

/// Read the sprint number from the flag or an interactive prompt on stderr.
fn sprint_number(args: &SprintArgs) -> Result<u32> {
    let stdin = std::io::stdin();
    resolve_sprint_number(args.sprint, &mut stdin.lock(), &mut std::io::stderr())
}

// === Assess ===

/// Result of `sprintrisk assess`.
#[derive(Serialize)]
pub struct AssessResult {
    pub board: String,
    pub context: SprintContext,
    /// Every assessed item, in board order
    pub items: Vec<RiskAssessment>,
    /// Ids of items with an unstaffed role
    pub missing_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl Output for AssessResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            self.report
                .clone()
                .unwrap_or_else(|| TemplateRenderer.render(&self.context)),
        ];

        let missing: Vec<&str> = self
            .items
            .iter()
            .filter(|a| a.has_missing_fields())
            .map(|a| a.item.name.as_str())
            .collect();
        if !missing.is_empty() {
            lines.push(String::new());
            lines.push(format!("Items missing fields ({}):", missing.len()));
            for name in missing {
                lines.push(format!("  🔴 {}", name));
            }
        }

        lines.join("\n")
    }
}

/// Assess a sprint without writing anything back.
pub fn assess(
    config: &ResolvedConfig,
    args: &SprintArgs,
    input: Option<&Path>,
    report: bool,
) -> Result<AssessResult> {
    let number = sprint_number(args)?;
    let today = effective_today(args.today);

    let source: Box<dyn BoardSource> = match input {
        Some(path) => Box::new(SnapshotFile::new(path)),
        None => Box::new(monday_client(config)?),
    };

    assess_from(source.as_ref(), &config.columns, number, today, report)
}

fn assess_from(
    source: &dyn BoardSource,
    aliases: &ColumnAliases,
    number: u32,
    today: NaiveDate,
    report: bool,
) -> Result<AssessResult> {
    let snapshot = source.load_board()?;
    let assessed = assess_sprint(&snapshot, aliases, number, today)?;

    let missing_fields = assessed
        .assessments
        .iter()
        .filter(|a| a.has_missing_fields())
        .map(|a| a.item.id.clone())
        .collect();
    let report = report.then(|| TemplateRenderer.render(&assessed.context));

    Ok(AssessResult {
        board: assessed.board_name,
        context: assessed.context,
        items: assessed.assessments,
        missing_fields,
        report,
    })
}

// === Run ===

/// Options for one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub sprint: u32,
    pub today: NaiveDate,
    /// Render only; never call the sink
    pub dry_run: bool,
    /// Flag items with missing owners before posting
    pub highlight: bool,
}

/// Result of `sprintrisk run`.
#[derive(Serialize)]
pub struct RunResult {
    pub board: String,
    pub sprint_group: String,
    pub as_of: NaiveDate,
    pub stats: SprintStats,
    pub timeline_status: TimelineStatus,
    pub renderer: &'static str,
    pub dry_run: bool,
    /// Items flagged (or, on a dry run, that would be flagged) for missing fields
    pub flagged: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryWrite>,
    pub report: String,
}

impl Output for RunResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let mut lines = vec![self.report.clone(), String::new()];

        let verb = if self.dry_run { "Would flag" } else { "Flagged" };
        lines.push(format!(
            "{} {} item(s) with missing fields.",
            verb,
            self.flagged.len()
        ));

        match &self.summary {
            Some(write) if write.created => {
                lines.push(format!("Created summary item '{}' ({}).", write.item_name, write.item_id))
            }
            Some(write) => lines.push(format!(
                "Updated summary item '{}' ({}).",
                write.item_name, write.item_id
            )),
            None => lines.push("Dry run: nothing was written to the board.".to_string()),
        }

        lines.join("\n")
    }
}

/// Assess a sprint on the live board, flag missing owners, and post the summary.
pub fn run(
    config: &ResolvedConfig,
    args: &SprintArgs,
    dry_run: bool,
    no_llm: bool,
    no_highlight: bool,
) -> Result<RunResult> {
    let sprint = sprint_number(args)?;
    let client = monday_client(config)?;
    let renderer = select_renderer(config, no_llm);

    let options = RunOptions {
        sprint,
        today: effective_today(args.today),
        dry_run,
        highlight: !no_highlight,
    };
    run_with(&client, &client, &config.columns, renderer.as_ref(), &options)
}

/// The `run` pipeline against any board source and sink.
///
/// Items are flagged before the summary is rendered and posted.
pub fn run_with(
    source: &dyn BoardSource,
    sink: &dyn BoardSink,
    aliases: &ColumnAliases,
    renderer: &dyn ReportRenderer,
    options: &RunOptions,
) -> Result<RunResult> {
    let snapshot = source.load_board()?;
    let assessed = assess_sprint(&snapshot, aliases, options.sprint, options.today)?;

    let flagged = if !options.highlight {
        Vec::new()
    } else if options.dry_run {
        assessed
            .assessments
            .iter()
            .filter(|a| a.has_missing_fields())
            .map(|a| a.item.id.clone())
            .collect()
    } else {
        highlight_missing_fields(sink, &assessed.columns, &assessed.assessments)?
    };

    let report = renderer.render(&assessed.context);
    tracing::debug!(renderer = renderer.name(), chars = report.len(), "rendered report");

    let summary = if options.dry_run {
        None
    } else {
        Some(write_summary(
            sink,
            &assessed.group_id,
            assessed.summary_item.as_ref(),
            &summary_item_name(options.today),
            &report,
        )?)
    };

    Ok(RunResult {
        board: assessed.board_name,
        sprint_group: assessed.group_title,
        as_of: options.today,
        stats: assessed.context.stats.clone(),
        timeline_status: assessed.context.timeline.status,
        renderer: renderer.name(),
        dry_run: options.dry_run,
        flagged,
        summary,
        report,
    })
}
