//! CLI argument definitions for Sprintrisk.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Long version string with build metadata from build.rs.
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SPRINTRISK_GIT_COMMIT"),
    ", built ",
    env!("SPRINTRISK_BUILD_TIMESTAMP"),
    ")"
);

/// Sprintrisk - Risk-aware sprint summaries for monday.com boards.
///
/// Start with `sprintrisk assess --sprint 4` to preview, then `sprintrisk run --sprint 4`
/// to flag items and post the summary.
#[derive(Parser, Debug)]
#[command(name = "sprintrisk")]
#[command(author, version, long_version = LONG_VERSION, about = "Risk-aware sprint summaries for monday.com boards", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Project config file (defaults to ./sprintrisk.kdl)
    #[arg(long = "config", global = true, env = "SPRINTRISK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that read a sprint group.
#[derive(Args, Debug, Clone, Default)]
pub struct SprintArgs {
    /// Sprint number; prompts on stdin when omitted
    #[arg(short, long)]
    pub sprint: Option<u32>,

    /// monday.com board id (overrides config)
    #[arg(long, env = "SPRINTRISK_BOARD_ID")]
    pub board_id: Option<u64>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, value_parser = parse_date)]
    pub today: Option<chrono::NaiveDate>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess a sprint, flag missing owners, and post the summary to the board
    Run {
        #[command(flatten)]
        sprint: SprintArgs,

        /// Compute and render the report without writing to the board
        #[arg(long)]
        dry_run: bool,

        /// Use the built-in template instead of the LLM
        #[arg(long)]
        no_llm: bool,

        /// Do not flag items with missing owners
        #[arg(long)]
        no_highlight: bool,
    },

    /// Assess a sprint and print the context without writing anything
    Assess {
        #[command(flatten)]
        sprint: SprintArgs,

        /// Read the board from a JSON snapshot instead of the API
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Also print the rendered template report
        #[arg(long)]
        report: bool,
    },

    /// Show how board columns map to tracked fields
    Columns {
        /// monday.com board id (overrides config)
        #[arg(long, env = "SPRINTRISK_BOARD_ID")]
        board_id: Option<u64>,

        /// Read the board from a JSON snapshot instead of the API
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Fetch the board and save it as a JSON snapshot
    Snapshot {
        /// monday.com board id (overrides config)
        #[arg(long, env = "SPRINTRISK_BOARD_ID")]
        board_id: Option<u64>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,

    /// Show config file locations
    Path,
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::parse_from([
            "sprintrisk", "-H", "run", "--sprint", "4", "--today", "2025-11-20", "--dry-run", "--no-llm",
        ]);
        assert!(cli.human_readable);
        match cli.command {
            Commands::Run {
                sprint,
                dry_run,
                no_llm,
                no_highlight,
            } => {
                assert_eq!(sprint.sprint, Some(4));
                assert_eq!(sprint.today, chrono::NaiveDate::from_ymd_opt(2025, 11, 20));
                assert!(dry_run);
                assert!(no_llm);
                assert!(!no_highlight);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        let result = Cli::try_parse_from(["sprintrisk", "assess", "--today", "20/11/2025"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::parse_from(["sprintrisk", "-vv", "config", "show"]);
        assert_eq!(cli.verbose, 2);
    }
}
