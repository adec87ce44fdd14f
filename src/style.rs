use std::io::IsTerminal;
use std::sync::LazyLock;

use anstyle::{AnsiColor, Reset, Style};
use regex::Regex;

pub const COMMAND: Style = Style::new().bold();
pub const NAME: Style = Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Blue)));
pub const ERROR: Style = Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Red)));
pub const WARNING: Style = Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Yellow)));

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("ANSI escape pattern is valid")
});

/// Remove ANSI escape sequences from `message`.
#[must_use]
pub fn strip_ansi(message: &str) -> String {
    ANSI_ESCAPE.replace_all(message, "").into_owned()
}

/// ANSI color helpers that only emit escape codes when the output is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Colorize when stdout is a terminal.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    /// Colorize when stderr is a terminal.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
        }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[must_use]
    pub fn paint(&self, style: Style, s: &str) -> String {
        if self.color {
            format!("{style}{s}{Reset}")
        } else {
            strip_ansi(s)
        }
    }

    #[must_use]
    pub fn error_label(&self) -> String {
        self.paint(ERROR, "error:")
    }

    #[must_use]
    pub fn warning_label(&self) -> String {
        self.paint(WARNING, "warning:")
    }
}
