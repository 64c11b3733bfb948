//! Color mode detection from environment and TTY status

use std::io::IsTerminal;

/// How terminal output should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Styled,
    Plain,
}

impl ColorMode {
    /// Resolve from NO_COLOR, CLICOLOR_FORCE, CLICOLOR, then stdout TTY status
    pub fn detect() -> Self {
        Self::resolve(
            std::env::var_os("NO_COLOR").is_some(),
            std::env::var("CLICOLOR_FORCE").ok().as_deref(),
            std::env::var("CLICOLOR").ok().as_deref(),
            std::io::stdout().is_terminal(),
        )
    }

    fn resolve(
        no_color: bool,
        force: Option<&str>,
        clicolor: Option<&str>,
        is_tty: bool,
    ) -> Self {
        if no_color {
            return ColorMode::Plain;
        }
        if force.is_some_and(|v| v != "0") {
            return ColorMode::Styled;
        }
        if clicolor == Some("0") || !is_tty {
            return ColorMode::Plain;
        }
        ColorMode::Styled
    }
}
