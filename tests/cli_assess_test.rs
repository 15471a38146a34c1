//! Integration tests for `sprintrisk assess` and `sprintrisk columns`
//! against board snapshot files.

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn assess_json(env: &TestEnv, extra: &[&str]) -> serde_json::Value {
    let board = env.write_board();
    let mut args = vec![
        "assess",
        "--input",
        board.to_str().unwrap(),
        "--today",
        "2025-11-20",
    ];
    args.extend_from_slice(extra);

    let output = env.cmd().args(&args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// === assess ===

#[test]
fn test_assess_stats_and_timeline() {
    let env = TestEnv::new();
    let json = assess_json(&env, &["--sprint", "4"]);

    assert_eq!(json["board"], "Roadmap");
    let ctx = &json["context"];
    assert_eq!(ctx["sprint_group"], "Sprint 4 (Nov 3 - Nov 21)");
    assert_eq!(ctx["as_of"], "2025-11-20");
    assert_eq!(ctx["stats"]["total_items"], 3);
    assert_eq!(ctx["stats"]["done_items"], 1);
    assert_eq!(ctx["stats"]["blocked_items"], 1);
    assert_eq!(ctx["stats"]["high_priority"], 1);
    assert_eq!(ctx["stats"]["risky_items"], 2);
    assert_eq!(ctx["timeline"]["sprint_end"], "2025-11-21");
    assert_eq!(ctx["timeline"]["status"], "ongoing");
    assert_eq!(ctx["timeline"]["late_items"][0]["id"], "102");
}

#[test]
fn test_assess_excludes_summary_rows() {
    let env = TestEnv::new();
    let json = assess_json(&env, &["--sprint", "4"]);
    let ids: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["101", "102", "103"]);
}

#[test]
fn test_assess_reasons_in_rule_order() {
    let env = TestEnv::new();
    let json = assess_json(&env, &["--sprint", "4"]);
    let risks = json["context"]["top_risks"].as_array().unwrap();
    assert_eq!(risks.len(), 2);

    assert_eq!(risks[0]["id"], "102");
    assert_eq!(risks[0]["reasons"][0], "blocked/stuck in one or more tracks");
    assert_eq!(risks[0]["reasons"][1], "timeline end passed");

    assert_eq!(risks[1]["id"], "103");
    assert_eq!(risks[1]["reasons"][0], "missing Developer");
    assert_eq!(risks[1]["reasons"][1], "near due (≤3 days) and not done");
    assert_eq!(risks[1]["reasons"][2], "high priority near due and not done");
    assert_eq!(json["missing_fields"][0], "103");
}

#[test]
fn test_assess_after_sprint_end_is_missed() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["-H", "assess", "--sprint", "4", "--today", "2025-11-24", "--input"])
        .arg(&board)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sprint end (from item timelines): 2025-11-21 [missed]"))
        .stdout(predicate::str::contains("Items not completed by sprint end:"))
        .stdout(predicate::str::contains("Billing export"));
}

#[test]
fn test_assess_human_output() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["-H", "assess", "--sprint", "4", "--today", "2025-11-20", "--input"])
        .arg(&board)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sprint Summary for Sprint 4 (Nov 3 - Nov 21) (2025-11-20):",
        ))
        .stdout(predicate::str::contains("- Total items: 3"))
        .stdout(predicate::str::contains("Items missing fields (1):"));
}

#[test]
fn test_assess_report_flag_adds_report() {
    let env = TestEnv::new();
    let json = assess_json(&env, &["--sprint", "4", "--report"]);
    let report = json["report"].as_str().unwrap();
    assert!(report.starts_with("Sprint Summary for Sprint 4"));
    assert!(report.contains("Actions:"));
}

#[test]
fn test_assess_reads_sprint_from_prompt() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["assess", "--today", "2025-11-20", "--input"])
        .arg(&board)
        .write_stdin("4\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Enter Sprint number (e.g., 4): "))
        .stdout(predicate::str::contains("\"total_items\":3"));
}

#[test]
fn test_assess_rejects_non_numeric_prompt_answer() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["assess", "--input"])
        .arg(&board)
        .write_stdin("four\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sprint number must be a non-negative integer"));
}

#[test]
fn test_assess_empty_sprint_fails() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["assess", "--sprint", "5", "--input"])
        .arg(&board)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No items found in group 'Sprint 5'. Add items or check permissions.",
        ));
}

#[test]
fn test_assess_unknown_sprint_fails() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["-H", "assess", "--sprint", "40", "--input"])
        .arg(&board)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No group starting with 'Sprint 40' found on board 'Roadmap'.",
        ));
}

#[test]
fn test_assess_missing_input_file() {
    let env = TestEnv::new();
    env.cmd()
        .args(["assess", "--sprint", "4", "--input", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_assess_column_override_from_project_config() {
    let env = TestEnv::new();
    // Point the developer field at a column that doesn't exist; the role is
    // then untracked and no longer reported missing.
    env.write_project_config("columns {\n    developer \"engineer\"\n}\n");
    let json = assess_json(&env, &["--sprint", "4"]);
    assert_eq!(json["missing_fields"].as_array().unwrap().len(), 0);
    assert_eq!(json["context"]["stats"]["risky_items"], 2);
}

// === columns ===

#[test]
fn test_columns_json() {
    let env = TestEnv::new();
    let board = env.write_board();
    let output = env
        .cmd()
        .args(["columns", "--input"])
        .arg(&board)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let mappings = json["mappings"].as_array().unwrap();
    assert_eq!(mappings.len(), 12);
    let dev = mappings.iter().find(|m| m["field"] == "dev-status").unwrap();
    assert_eq!(dev["column_id"], "status");
    let risk = mappings
        .iter()
        .find(|m| m["field"] == "risk-highlight")
        .unwrap();
    assert_eq!(risk["column_title"], "Risk Highlight");
}

#[test]
fn test_columns_human() {
    let env = TestEnv::new();
    let board = env.write_board();
    env.cmd()
        .args(["-H", "columns", "--input"])
        .arg(&board)
        .assert()
        .success()
        .stdout(predicate::str::contains("Columns on board 'Roadmap':"))
        .stdout(predicate::str::contains("Dev Status (status)"))
        .stdout(predicate::str::contains("not found (tried: use case)"));
}
