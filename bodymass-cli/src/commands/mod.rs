//! CLI command implementations.

pub mod check;
pub mod rules;
pub mod validate;

use colored::Colorize;

/// Terminal output shared by the commands.
///
/// Quiet mode drops headings and informational lines; results and field
/// errors are always printed.
#[derive(Debug, Clone, Copy)]
pub struct Ui {
    quiet: bool,
}

impl Ui {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn heading(&self, title: &str) {
        if !self.quiet {
            println!("{}", title.bright_cyan().bold());
            println!();
        }
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {}", "→".cyan(), msg);
        }
    }

    pub fn success(&self, msg: &str) {
        println!("  {} {}", "✓".green().bold(), msg.green());
    }

    pub fn field_error(&self, field: &str, msg: &str) {
        println!("  {} {}: {}", "✗".red().bold(), field.bold(), msg.red());
    }
}
