//! Common test utilities for sprintrisk integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/sprintrisk/` directory or API tokens.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::json;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated config.
///
/// - `work_dir`: current directory of every command (project config lives here)
/// - `config_dir`: system config directory (via `SPRINTRISK_CONFIG_DIR`)
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the sprintrisk binary with isolated config and no tokens.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sprintrisk"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("SPRINTRISK_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("MONDAY_API_TOKEN");
        cmd.env_remove("OPENAI_API_KEY");
        cmd.env_remove("SPRINTRISK_BOARD_ID");
        cmd.env_remove("SPRINTRISK_CONFIG");
        cmd.env_remove("SPRINTRISK_LOG");
        cmd
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Write `sprintrisk.kdl` in the working directory.
    pub fn write_project_config(&self, content: &str) -> PathBuf {
        let path = self.work_dir.path().join("sprintrisk.kdl");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write `config.kdl` in the system config directory.
    pub fn write_system_config(&self, content: &str) -> PathBuf {
        let path = self.config_dir.path().join("config.kdl");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write the sample board snapshot and return its path.
    pub fn write_board(&self) -> PathBuf {
        let path = self.work_dir.path().join("board.json");
        std::fs::write(&path, sample_board().to_string()).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A board with three sprint groups.
///
/// Sprint 4 (as of 2025-11-20): one fully done item, one stuck and overdue
/// item, one high priority item due tomorrow with no developer, plus an old
/// summary row. Sprint 5 is empty.
pub fn sample_board() -> serde_json::Value {
    let dev = r#"{"personsAndTeams":[{"id":7,"kind":"person"}]}"#;
    let nobody = r#"{"personsAndTeams":[]}"#;
    let timeline = |to: &str| format!(r#"{{"from":"2025-11-03","to":"{}"}}"#, to);

    json!({
        "id": "18327136960",
        "name": "Roadmap",
        "groups": [
            { "id": "g3", "title": "Sprint 3" },
            { "id": "g4", "title": "Sprint 4 (Nov 3 - Nov 21)" },
            { "id": "g5", "title": "Sprint 5" }
        ],
        "columns": [
            { "id": "status", "title": "Dev Status", "type": "status" },
            { "id": "status_1", "title": "Design Status", "type": "status" },
            { "id": "status_2", "title": "Product Status", "type": "status" },
            { "id": "priority", "title": "Priority", "type": "status" },
            { "id": "people", "title": "Developer", "type": "people" },
            { "id": "timeline", "title": "Timeline", "type": "timeline" },
            { "id": "risk", "title": "Risk Highlight", "type": "status" }
        ],
        "items": [
            {
                "id": "101",
                "name": "Checkout revamp",
                "group": { "id": "g4", "title": "Sprint 4 (Nov 3 - Nov 21)" },
                "column_values": [
                    { "id": "status", "text": "Done", "value": null },
                    { "id": "status_1", "text": "Done", "value": null },
                    { "id": "status_2", "text": "Released", "value": null },
                    { "id": "people", "text": "Dana", "value": dev },
                    { "id": "timeline", "text": "", "value": timeline("2025-11-19") }
                ]
            },
            {
                "id": "102",
                "name": "Search filters",
                "group": { "id": "g4", "title": "Sprint 4 (Nov 3 - Nov 21)" },
                "column_values": [
                    { "id": "status", "text": "Stuck", "value": null },
                    { "id": "people", "text": "Dana", "value": dev },
                    { "id": "timeline", "text": "", "value": timeline("2025-11-18") }
                ]
            },
            {
                "id": "103",
                "name": "Billing export",
                "group": { "id": "g4", "title": "Sprint 4 (Nov 3 - Nov 21)" },
                "column_values": [
                    { "id": "status", "text": "Working on it", "value": null },
                    { "id": "priority", "text": "High", "value": null },
                    { "id": "people", "text": "", "value": nobody },
                    { "id": "timeline", "text": "", "value": timeline("2025-11-21") }
                ]
            },
            {
                "id": "104",
                "name": "Sprint Summary - 2025-11-13",
                "group": { "id": "g4", "title": "Sprint 4 (Nov 3 - Nov 21)" },
                "column_values": []
            },
            {
                "id": "201",
                "name": "Other sprint work",
                "group": { "id": "g3", "title": "Sprint 3" },
                "column_values": []
            }
        ]
    })
}
