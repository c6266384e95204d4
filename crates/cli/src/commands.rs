//! Clap command tree definition.
//!
//! Global flags override `roster.toml`; subcommands run once and exit.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("roster")
        .about("Read-only SQL over the SNH48 group roster, refreshed on demand")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Config file (default: roster.toml)")
                .global(true),
        )
        .arg(
            Arg::new("cache-file")
                .long("cache-file")
                .value_name("FILE")
                .help("Snapshot cache file")
                .global(true),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("URL")
                .help("Upstream roster endpoint")
                .global(true),
        )
        .arg(
            Arg::new("ttl")
                .long("ttl")
                .value_name("SECS")
                .help("Seconds before a query triggers a refresh")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (tab-separated, no header)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_query())
        .subcommand(build_refresh())
        .subcommand(build_status())
        .subcommand(build_schema())
}

fn build_query() -> Command {
    Command::new("query")
        .about("Run a read-only SQL statement against the members table")
        .arg(
            Arg::new("sql")
                .required(true)
                .num_args(1..)
                .trailing_var_arg(true)
                .help("SQL statement; several words are joined with spaces"),
        )
}

fn build_refresh() -> Command {
    Command::new("refresh").about("Fetch the roster now and replace the served data")
}

fn build_status() -> Command {
    Command::new("status").about("Show freshness state and counters")
}

fn build_schema() -> Command {
    Command::new("schema").about("List the members columns and example queries")
}
