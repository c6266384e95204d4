//! REPL loop with rustyline.
//!
//! Interactive mode: prompt, meta-commands, history.
//! Pipe mode: read lines from stdin, execute each.

use std::io::{self, BufRead};
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

use crate::format::{format_error, format_output, format_stale_warning, OutputMode};
use crate::parse::{parse_line, CliAction, MetaCommand};
use crate::state::SessionState;

/// Run the interactive REPL.
pub fn run_repl(state: &SessionState, mode: OutputMode) {
    let config = Config::builder().history_ignore_space(true).build();
    let mut rl = match DefaultEditor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("(error) Failed to start line editor: {}", e);
            return;
        }
    };

    let history_path = history_file();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline(&state.prompt()) {
            Ok(line) => {
                let action = match parse_line(&line) {
                    Some(action) => action,
                    None => continue,
                };
                let _ = rl.add_history_entry(line.trim());

                match action {
                    Ok(CliAction::Meta(MetaCommand::Quit)) => break,
                    Ok(CliAction::Meta(MetaCommand::Clear)) => {
                        // ANSI clear screen
                        print!("\x1B[2J\x1B[1;1H");
                    }
                    Ok(CliAction::Meta(MetaCommand::Help)) => print_help(),
                    Ok(action) => {
                        execute_action(action, state, mode);
                    }
                    Err(e) => eprintln!("(error) {}", e),
                }
            }
            // Ctrl-C: new prompt
            Err(ReadlineError::Interrupted) => continue,
            // Ctrl-D: exit
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("(error) {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
}

/// Run in pipe mode: read lines from stdin, execute each.
///
/// Returns 1 if any line failed, 0 otherwise.
pub fn run_pipe(state: &SessionState, mode: OutputMode) -> i32 {
    let stdin = io::stdin();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        match parse_line(&line) {
            None => continue,
            Some(Ok(CliAction::Meta(MetaCommand::Quit))) => break,
            Some(Ok(CliAction::Meta(_))) => continue,
            Some(Ok(action)) => {
                if !execute_action(action, state, mode) {
                    exit_code = 1;
                }
            }
            Some(Err(e)) => {
                eprintln!("(error) {}", e);
                exit_code = 1;
            }
        }
    }

    exit_code
}

/// Execute a parsed action. Returns true on success, false on error.
pub fn execute_action(action: CliAction, state: &SessionState, mode: OutputMode) -> bool {
    let cmd = match action {
        CliAction::Execute(cmd) => cmd,
        // Meta-commands should have been handled before reaching here
        CliAction::Meta(_) => return true,
    };
    match state.execute(cmd) {
        Ok(output) => {
            if let Some(warning) = format_stale_warning(&output, mode) {
                eprintln!("{}", warning);
            }
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            true
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            false
        }
    }
}

fn print_help() {
    println!("Enter a read-only SQL statement against the `members` table, e.g.");
    println!("  SELECT sname, tname FROM members WHERE gname = 'SNH' ORDER BY sid;");
    println!();
    println!("Meta-commands:");
    println!("  .refresh   Fetch the roster now");
    println!("  .status    Show freshness state and counters");
    println!("  .schema    List the columns and example queries");
    println!("  .clear     Clear the screen");
    println!("  .help      Show this help");
    println!("  .quit      Exit (also .exit, Ctrl-D)");
}

fn history_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".roster_history"))
}
