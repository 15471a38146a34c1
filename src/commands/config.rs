//! `config show` and `config path`.

use super::Output;
use crate::config::{ConfigPaths, ResolvedConfig, mask_token};
use crate::models::FieldKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of `sprintrisk config show`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigShowResult {
    #[serde(flatten)]
    pub config: ResolvedConfig,
    /// Accepted column titles per field
    pub columns: BTreeMap<FieldKey, Vec<String>>,
    /// Masked monday.com token, if set
    pub monday_token: Option<String>,
    /// Masked OpenAI key, if set
    pub openai_key: Option<String>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let c = &self.config;
        let mut lines = vec!["Resolved configuration:".to_string()];

        match &c.board_id {
            Some(id) => lines.push(format!("  board-id:      {} ({})", id.value, id.source)),
            None => lines.push("  board-id:      (not set)".to_string()),
        }
        lines.push(format!(
            "  page-limit:    {} ({})",
            c.page_limit.value, c.page_limit.source
        ));
        lines.push(format!("  api-url:       {} ({})", c.api_url.value, c.api_url.source));
        lines.push(format!(
            "  llm-model:     {} ({})",
            c.llm_model.value, c.llm_model.source
        ));
        lines.push(format!(
            "  output-format: {} ({})",
            c.output_format.value, c.output_format.source
        ));

        let token_line = |name: &str, masked: &Option<String>| match masked {
            Some(t) => format!("  {:<14} {}", format!("{}:", name), t),
            None => format!("  {:<14} (not set)", format!("{}:", name)),
        };
        lines.push(String::new());
        lines.push("Tokens:".to_string());
        lines.push(token_line("monday", &self.monday_token));
        lines.push(token_line("openai", &self.openai_key));

        lines.push(String::new());
        lines.push("Columns:".to_string());
        for (field, titles) in &self.columns {
            lines.push(format!("  {:<16} {}", field.as_str(), titles.join(", ")));
        }

        lines.join("\n")
    }
}

/// Show the resolved configuration with masked tokens.
pub fn config_show(config: &ResolvedConfig) -> ConfigShowResult {
    let columns = FieldKey::ALL
        .into_iter()
        .map(|field| (field, config.columns.titles(field).to_vec()))
        .collect();

    ConfigShowResult {
        config: config.clone(),
        columns,
        monday_token: config.monday_token.as_ref().map(|t| mask_token(&t.value)),
        openai_key: config.openai_key.as_ref().map(|t| mask_token(&t.value)),
    }
}

/// One config file location.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub path: Option<PathBuf>,
    pub exists: bool,
}

impl ConfigFile {
    fn new(path: Option<PathBuf>) -> Self {
        let exists = path.as_ref().is_some_and(|p| p.exists());
        Self { path, exists }
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(p) if self.exists => p.display().to_string(),
            Some(p) => format!("{} (not found)", p.display()),
            None => "(unavailable)".to_string(),
        }
    }
}

/// Result of `sprintrisk config path`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPathResult {
    pub system: ConfigFile,
    pub project: ConfigFile,
}

impl Output for ConfigPathResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        format!(
            "System config:  {}\nProject config: {}",
            self.system.describe(),
            self.project.describe()
        )
    }
}

/// Show where config files are looked up.
pub fn config_path(paths: &ConfigPaths) -> ConfigPathResult {
    ConfigPathResult {
        system: ConfigFile::new(paths.system.clone()),
        project: ConfigFile::new(paths.project.clone()),
    }
}
