//! Configuration for Sprintrisk.
//!
//! Settings live in KDL files:
//!
//! - System: `~/.config/sprintrisk/config.kdl` (or `$SPRINTRISK_CONFIG_DIR/config.kdl`)
//! - Project: `./sprintrisk.kdl`, or the file passed with `--config`
//!
//! Contains:
//! - `board-id` - monday.com board to read
//! - `page-limit` - items per API page (1-500)
//! - `api-url` - GraphQL endpoint
//! - `llm-model` - chat model for the report
//! - `output-format` - "json" or "human"
//! - `columns` block - column title overrides per field
//!
//! ## Secrets
//!
//! API tokens are only taken from the environment (`MONDAY_API_TOKEN`,
//! `OPENAI_API_KEY`) and are never written to or read from config files.
//!
//! ## Precedence
//!
//! CLI flag > project config > system config > defaults.
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, ConfigPaths, MONDAY_TOKEN_ENV, OPENAI_KEY_ENV, Resolved,
    ResolvedConfig, ValueSource, mask_token, resolve_config,
};
pub use schema::{OutputFormat, SprintriskConfig};
