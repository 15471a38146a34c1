//! Chat-completion backed report renderer.

use super::ReportRenderer;
use crate::models::SprintContext;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Default chat completions endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for the summary.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f64 = 0.2;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are an expert Agile PM assistant.";

const INSTRUCTIONS: &str = "You are an Agile PM assistant. Using the structured context below, \
produce a crisp sprint summary ONLY for the selected sprint group. \
Include totals, at-risk counts, key risks with reasons (top 5), and 2–3 actions. \
Use the 'timeline.status' and 'timeline.sprint_end' fields to explain whether \
the sprint timeline was MET, MISSED, or is ONGOING. If it is MISSED, \
explicitly name the items in 'timeline.late_items' that were not completed by \
the sprint end date, and which track(s) are still open (product/design/dev). \
Keep it under ~250 words.";

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Renders the report through an OpenAI-compatible chat completions API.
pub struct OpenAiRenderer {
    agent: ureq::Agent,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiRenderer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            api_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Point the renderer at another endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn complete(&self, prompt: &str) -> Result<String, String> {
        let body = json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .agent
            .post(&self.api_url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body);

        let parsed: ChatResponse = match response {
            Ok(resp) => resp.into_json().map_err(|e| e.to_string())?,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(format!("HTTP {}: {}", code, body));
            }
            Err(e) => return Err(e.to_string()),
        };

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| "response contained no message".to_string())
    }
}

impl ReportRenderer for OpenAiRenderer {
    fn render(&self, ctx: &SprintContext) -> String {
        let context_json = context_json(ctx);
        let prompt = build_prompt(&context_json);

        match self.complete(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, model = %self.model, "LLM summary failed; using fallback");
                fallback_text(&e, &context_json)
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn context_json(ctx: &SprintContext) -> String {
    serde_json::to_string_pretty(ctx).unwrap_or_else(|_| "{}".to_string())
}

/// Prompt sent as the user message.
pub fn build_prompt(context_json: &str) -> String {
    format!("{}\n\nCONTEXT:\n{}\n", INSTRUCTIONS, context_json)
}

/// Report body used when the model call fails.
pub fn fallback_text(error: &str, context_json: &str) -> String {
    format!("(LLM error: {})\n\nFallback:\n{}", error, context_json)
}
