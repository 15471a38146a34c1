//! Report rendering for a sprint context.
//!
//! Two renderers are available:
//! - [`TemplateRenderer`]: deterministic plain-text summary
//! - [`OpenAiRenderer`]: asks a chat model to phrase the summary, falling back
//!   to the raw context on failure

pub mod openai;

pub use openai::OpenAiRenderer;

use crate::models::{SprintContext, TimelineStatus};

/// Number of risks listed in the template report.
pub const REPORT_RISK_LIMIT: usize = 5;

/// Turns a sprint context into human-readable text.
pub trait ReportRenderer {
    /// Render the report. Renderers never fail; they degrade to simpler text.
    fn render(&self, ctx: &SprintContext) -> String;

    /// Short name used in logs and command output.
    fn name(&self) -> &'static str;
}

/// Deterministic text report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl ReportRenderer for TemplateRenderer {
    fn render(&self, ctx: &SprintContext) -> String {
        let stats = &ctx.stats;
        let timeline = &ctx.timeline;
        let sprint_end = timeline
            .sprint_end
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string());

        let mut lines = vec![
            format!(
                "Sprint Summary for {} ({}):",
                ctx.sprint_group,
                ctx.as_of.format("%Y-%m-%d")
            ),
            format!("- Total items: {}", stats.total_items),
            format!("- Done: {}", stats.done_items),
            format!("- Blocked: {}", stats.blocked_items),
            format!("- High priority: {}", stats.high_priority),
            format!("- At risk: {}", stats.risky_items),
            format!(
                "- Sprint end (from item timelines): {} [{}]",
                sprint_end, timeline.status
            ),
            String::new(),
            "Top risks:".to_string(),
        ];

        for risk in ctx.top_risks.iter().take(REPORT_RISK_LIMIT) {
            let end = risk
                .item
                .timeline_end
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            lines.push(format!(
                "• {} — {} | Priority: {} | Timeline end: {}",
                risk.item.name,
                risk.reason_texts().join(", "),
                risk.item.priority_text,
                end
            ));
        }

        if timeline.status == TimelineStatus::Missed && !timeline.late_items.is_empty() {
            lines.push(String::new());
            lines.push("Items not completed by sprint end:".to_string());
            for late in &timeline.late_items {
                lines.push(format!(
                    "• {} (due {}) — Product: {}, Design: {}, Dev: {}",
                    late.name,
                    late.timeline_end.format("%Y-%m-%d"),
                    dash_if_empty(&late.product_status),
                    dash_if_empty(&late.design_status),
                    dash_if_empty(&late.dev_status),
                ));
            }
        }

        lines.extend([
            String::new(),
            "Actions:".to_string(),
            "- Assign missing Product owner/Designer/Developer (🔴 items).".to_string(),
            "- Clear blockers across Product/Design/Dev; escalate stalled items.".to_string(),
            "- Focus high-priority items due within 3 days; replan if needed.".to_string(),
        ]);

        lines.join("\n")
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

fn dash_if_empty(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
