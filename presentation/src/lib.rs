//! Presentation layer for taskforce
//!
//! This crate contains the CLI definition, the console formatter for
//! finished sessions, and the live progress reporter.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ProgressReporter;
