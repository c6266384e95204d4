//! Roster CLI: read-only SQL over the SNH48 group roster.
//!
//! Three modes:
//! - **Shell mode**: `roster [flags] COMMAND` runs one command and exits
//! - **REPL mode**: `roster [flags]` opens an interactive prompt (if stdin is a TTY)
//! - **Pipe mode**: `echo "SELECT COUNT(*) FROM members" | roster` runs stdin line by line

mod commands;
mod format;
mod parse;
mod repl;
mod state;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use roster_engine::CONFIG_FILE_NAME;
use roster_executor::{Roster, RosterConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::OutputMode;
use parse::matches_to_action;
use state::SessionState;

fn main() {
    init_logging();

    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let roster = match Roster::open(&config) {
        Ok(roster) => roster,
        Err(e) => {
            eprintln!("{}", format::format_error(&e, output_mode));
            process::exit(1);
        }
    };
    let state = SessionState::new(roster);

    if matches.subcommand().is_some() {
        let exit_code = run_shell_mode(&matches, &state, output_mode);
        process::exit(exit_code);
    } else if std::io::stdin().is_terminal() {
        repl::run_repl(&state, output_mode);
    } else {
        let exit_code = repl::run_pipe(&state, output_mode);
        process::exit(exit_code);
    }
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `roster.toml` (or `--config`), then `ROSTER_CACHE_TTL` (or `SNH48_CACHE_TTL`), then flags.
fn load_config(matches: &clap::ArgMatches) -> Result<RosterConfig, String> {
    let path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    if matches.get_one::<String>("config").is_some() && !path.exists() {
        return Err(format!("(error) Config file not found: {}", path.display()));
    }

    let mut config = RosterConfig::load(&path).map_err(|e| format!("(error) {}", e))?;
    if let Some(cache_file) = matches.get_one::<String>("cache-file") {
        config.cache_file = PathBuf::from(cache_file);
    }
    if let Some(source) = matches.get_one::<String>("source") {
        config.source_url = source.clone();
    }
    if let Some(ttl) = matches.get_one::<u64>("ttl") {
        config.ttl_secs = *ttl;
    }
    config.validate().map_err(|e| format!("(error) {}", e))?;

    debug!(
        target: "roster::cli",
        config = %path.display(),
        cache_file = %config.cache_file.display(),
        ttl_secs = config.ttl_secs,
        "Configuration loaded"
    );
    Ok(config)
}

fn run_shell_mode(matches: &clap::ArgMatches, state: &SessionState, mode: OutputMode) -> i32 {
    match matches_to_action(matches) {
        Ok(action) => {
            if repl::execute_action(action, state, mode) {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    }
}
