// Wed Jan 15 2026 - Alex

pub mod cli;
pub mod format;
pub mod prompt;

pub use cli::{Args, Command, CommandHandler};
pub use format::format_declaration;
pub use prompt::InteractivePrompt;

use colored::Colorize;

/// Status lines on stderr; stdout carries only the annotated output.
pub struct UIManager {
    quiet: bool,
}

impl UIManager {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}", "[*]".blue(), message);
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}", "[+]".green(), message);
    }

    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}", "[!]".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "[!]".red(), message);
    }
}

impl Default for UIManager {
    fn default() -> Self {
        Self::new()
    }
}
