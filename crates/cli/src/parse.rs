//! Input line and ArgMatches → Command/MetaCommand conversion.
//!
//! REPL and pipe lines are either a dot meta-command or SQL. Shell mode
//! maps clap subcommands onto the same [`CliAction`].

use clap::ArgMatches;
use roster_executor::Command;

/// The result of parsing user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// A command to execute through the executor.
    Execute(Command),
    /// A REPL-only meta-command.
    Meta(MetaCommand),
}

/// REPL meta-commands that do not map onto a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Help,
    Quit,
    Clear,
}

/// Convert shell-mode matches into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("query", sub)) => {
            let sql = sub
                .get_many::<String>("sql")
                .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            Ok(CliAction::Execute(Command::query(sql)))
        }
        Some(("refresh", _)) => Ok(CliAction::Execute(Command::Refresh)),
        Some(("status", _)) => Ok(CliAction::Execute(Command::Status)),
        Some(("schema", _)) => Ok(CliAction::Execute(Command::Schema)),
        Some((other, _)) => Err(format!("Unknown command: {}", other)),
        None => Err("No command given".to_string()),
    }
}

/// Parse one REPL or pipe line.
///
/// Returns `None` for blank lines and `#` / `--` comments. A trailing `;`
/// on a meta-command is ignored.
pub fn parse_line(line: &str) -> Option<Result<CliAction, String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("--") {
        return None;
    }
    if let Some(meta) = trimmed.strip_prefix('.') {
        let name = meta.trim_end_matches(';').trim().to_ascii_lowercase();
        let action = match name.as_str() {
            "refresh" => Ok(CliAction::Execute(Command::Refresh)),
            "status" => Ok(CliAction::Execute(Command::Status)),
            "schema" => Ok(CliAction::Execute(Command::Schema)),
            "help" => Ok(CliAction::Meta(MetaCommand::Help)),
            "quit" | "exit" => Ok(CliAction::Meta(MetaCommand::Quit)),
            "clear" => Ok(CliAction::Meta(MetaCommand::Clear)),
            _ => Err(format!("Unknown meta-command: .{} (try .help)", name)),
        };
        return Some(action);
    }
    Some(Ok(CliAction::Execute(Command::query(trimmed))))
}
