//! Status lines for the CLI
//!
//! The suite report itself goes to stderr through the harness; these are the
//! short one-line outcomes printed around it.

use colored::Colorize;

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print failure message
pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red(), message.red());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "•".dimmed(), message);
}
