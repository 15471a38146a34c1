//! Unified precedence resolution for configuration and API tokens.
//!
//! ## Config Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Project config (`--config <path>` or `./sprintrisk.kdl`)
//! 3. System config (`~/.config/sprintrisk/config.kdl`)
//! 4. Built-in defaults
//!
//! ## Tokens
//!
//! `MONDAY_API_TOKEN` and `OPENAI_API_KEY` are read from the environment only.

use crate::Result;
use crate::board::ColumnAliases;
use crate::board::client::{DEFAULT_API_URL, DEFAULT_PAGE_LIMIT};
use crate::config::{OutputFormat, SprintriskConfig};
use crate::report::openai::DEFAULT_MODEL;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the monday.com API token.
pub const MONDAY_TOKEN_ENV: &str = "MONDAY_API_TOKEN";

/// Environment variable holding the OpenAI API key.
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "SPRINTRISK_CONFIG_DIR";

/// File name of the project-level config.
pub const PROJECT_CONFIG_FILE: &str = "sprintrisk.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from the project config file
    Project,
    /// Value from the system config file
    System,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Locations of the config files taking part in resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigPaths {
    pub system: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    /// Standard locations: system dir plus `sprintrisk.kdl` in `cwd`.
    ///
    /// An explicit project path replaces the `cwd` lookup.
    pub fn discover(cwd: &Path, explicit: Option<PathBuf>) -> Self {
        Self {
            system: system_config_path(),
            project: Some(explicit.unwrap_or_else(|| cwd.join(PROJECT_CONFIG_FILE))),
        }
    }
}

/// Directory holding the system config.
///
/// `SPRINTRISK_CONFIG_DIR` wins over the platform config directory.
pub fn system_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::config_dir().map(|d| d.join("sprintrisk"))
}

/// Path of the system config file.
pub fn system_config_path() -> Option<PathBuf> {
    system_config_dir().map(|d| d.join("config.kdl"))
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub board_id: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board_id(mut self, board_id: u64) -> Self {
        self.board_id = Some(board_id);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub board_id: Option<Resolved<u64>>,
    pub page_limit: Resolved<u32>,
    pub api_url: Resolved<String>,
    pub llm_model: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
    #[serde(skip)]
    pub columns: ColumnAliases,
    #[serde(skip)]
    pub monday_token: Option<Resolved<String>>,
    #[serde(skip)]
    pub openai_key: Option<Resolved<String>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            board_id: None,
            page_limit: Resolved::new(DEFAULT_PAGE_LIMIT, ValueSource::Default),
            api_url: Resolved::new(DEFAULT_API_URL.to_string(), ValueSource::Default),
            llm_model: Resolved::new(DEFAULT_MODEL.to_string(), ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            columns: ColumnAliases::default(),
            monday_token: None,
            openai_key: None,
        }
    }
}

impl ResolvedConfig {
    /// Board id, or an error explaining how to set one.
    pub fn require_board_id(&self) -> Result<u64> {
        self.board_id.as_ref().map(|r| r.value).ok_or_else(|| {
            crate::Error::Config(
                "no board id configured: pass --board-id or set board-id in config.kdl".to_string(),
            )
        })
    }

    /// monday.com token, or an error naming the variable to set.
    pub fn require_monday_token(&self) -> Result<&str> {
        self.monday_token
            .as_ref()
            .map(|r| r.value.as_str())
            .ok_or(crate::Error::MissingToken(MONDAY_TOKEN_ENV))
    }

    pub fn openai_key(&self) -> Option<&str> {
        self.openai_key.as_ref().map(|r| r.value.as_str())
    }

    pub fn is_human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }
}

/// Mask a secret for display, keeping the first and last 4 characters.
///
/// Counts characters, not bytes, so non-ASCII tokens never split a code point.
pub fn mask_token(token: &str) -> String {
    let head: String = token.chars().take(4).collect();
    if token.chars().count() <= 12 {
        return format!("{}...", head);
    }
    let mut tail: Vec<char> = token.chars().rev().take(4).collect();
    tail.reverse();
    format!("{}...{}", head, tail.into_iter().collect::<String>())
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(paths: &ConfigPaths, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = match &paths.system {
        Some(path) => SprintriskConfig::load(path)?,
        None => SprintriskConfig::new(),
    };
    let project = match &paths.project {
        Some(path) => SprintriskConfig::load(path)?,
        None => SprintriskConfig::new(),
    };

    let mut result = ResolvedConfig::default();

    if let Some(id) = overrides.board_id {
        result.board_id = Some(Resolved::new(id, ValueSource::CliFlag));
    } else if let Some(id) = project.board_id {
        result.board_id = Some(Resolved::new(id, ValueSource::Project));
    } else if let Some(id) = system.board_id {
        result.board_id = Some(Resolved::new(id, ValueSource::System));
    }

    if let Some(limit) = project.page_limit {
        result.page_limit = Resolved::new(limit, ValueSource::Project);
    } else if let Some(limit) = system.page_limit {
        result.page_limit = Resolved::new(limit, ValueSource::System);
    }

    if let Some(ref url) = project.api_url {
        result.api_url = Resolved::new(url.clone(), ValueSource::Project);
    } else if let Some(ref url) = system.api_url {
        result.api_url = Resolved::new(url.clone(), ValueSource::System);
    }

    if let Some(ref model) = project.llm_model {
        result.llm_model = Resolved::new(model.clone(), ValueSource::Project);
    } else if let Some(ref model) = system.llm_model {
        result.llm_model = Resolved::new(model.clone(), ValueSource::System);
    }

    if let Some(ref format) = overrides.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::CliFlag);
    } else if let Some(ref format) = project.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::Project);
    } else if let Some(ref format) = system.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::System);
    }

    let mut columns = system.clone();
    columns.merge(&project);
    result.columns = ColumnAliases::default().with_overrides(&columns.columns);

    result.monday_token = token_from_env(MONDAY_TOKEN_ENV);
    result.openai_key = token_from_env(OPENAI_KEY_ENV);

    Ok(result)
}

fn token_from_env(name: &str) -> Option<Resolved<String>> {
    std::env::var(name)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .map(|t| Resolved::new(t, ValueSource::EnvVar(name.to_string())))
}
