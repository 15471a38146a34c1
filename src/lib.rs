//! Sprintrisk - Risk-aware sprint summaries for monday.com boards.
//!
//! This library provides the core functionality for the `sprintrisk` CLI tool:
//! normalizing board items, evaluating per-item risk rules, aggregating a
//! sprint timeline verdict, and rendering/posting the resulting report.

pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod report;

/// Library-level error type for Sprintrisk operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Board API error: {0}")]
    Board(#[from] board::BoardError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No items found in group '{0}'. Add items or check permissions.")]
    EmptySprint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing API token: set the {0} environment variable")]
    MissingToken(&'static str),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Sprintrisk operations.
pub type Result<T> = std::result::Result<T, Error>;
