//! Roster wrapper used by every CLI mode.

use roster_executor::{Command, Output, Phase, Result, Roster};

/// Holds the opened roster and renders the REPL prompt.
pub struct SessionState {
    roster: Roster,
}

impl SessionState {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }

    /// Execute a command via the executor.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        self.roster.executor().execute(cmd)
    }

    /// Build the prompt string.
    ///
    /// Format: `roster> ` once data is loaded, `roster(empty)> ` before.
    pub fn prompt(&self) -> String {
        match self.roster.executor().coordinator().phase() {
            Phase::Empty | Phase::Loading => "roster(empty)> ".to_string(),
            Phase::Ready | Phase::Refreshing => "roster> ".to_string(),
        }
    }
}
