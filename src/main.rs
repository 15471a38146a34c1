//! Sprintrisk CLI - Risk-aware sprint summaries for monday.com boards.

use clap::Parser;
use sprintrisk::cli::{Cli, Commands, ConfigCommands};
use sprintrisk::commands::{self, Output};
use sprintrisk::config::{ConfigOverrides, ConfigPaths, OutputFormat, ResolvedConfig, resolve_config};
use sprintrisk::logging;
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let paths = ConfigPaths::discover(&cwd, cli.config.clone());

    let mut overrides = ConfigOverrides::new();
    if let Some(board_id) = board_id_flag(&cli.command) {
        overrides = overrides.with_board_id(board_id);
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }

    // Errors follow the resolved output format once config has loaded.
    let (result, human) = match resolve_config(&paths, &overrides) {
        Ok(config) => {
            let human = config.is_human();
            (run_command(cli.command, &config, &paths, human), human)
        }
        Err(e) => (Err(e), cli.human_readable),
    };

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// `--board-id` from whichever subcommand carries it.
fn board_id_flag(command: &Commands) -> Option<u64> {
    match command {
        Commands::Run { sprint, .. } | Commands::Assess { sprint, .. } => sprint.board_id,
        Commands::Columns { board_id, .. } | Commands::Snapshot { board_id, .. } => *board_id,
        Commands::Config { .. } => None,
    }
}

fn run_command(
    command: Commands,
    config: &ResolvedConfig,
    paths: &ConfigPaths,
    human: bool,
) -> Result<(), sprintrisk::Error> {
    match command {
        Commands::Run {
            sprint,
            dry_run,
            no_llm,
            no_highlight,
        } => {
            let result = commands::run(config, &sprint, dry_run, no_llm, no_highlight)?;
            output(&result, human);
        }
        Commands::Assess {
            sprint,
            input,
            report,
        } => {
            let result = commands::assess(config, &sprint, input.as_deref(), report)?;
            output(&result, human);
        }
        Commands::Columns { input, .. } => {
            let result = commands::columns(config, input.as_deref())?;
            output(&result, human);
        }
        Commands::Snapshot { output: path, .. } => {
            let result = commands::snapshot(config, &path)?;
            output(&result, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(config), human),
            ConfigCommands::Path => output(&commands::config_path(paths), human),
        },
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
