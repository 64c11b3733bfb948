//! Terminal display module
//!
//! Prints rendered offer summaries with automatic TTY detection.

mod formatter;
mod terminal;

pub use formatter::print_markdown;
