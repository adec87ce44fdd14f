//! Environment-driven settings of the `lus` binary

use std::path::PathBuf;

/// Selects a task file explicitly instead of searching upwards.
pub const FILE_VAR: &str = "LUS_FILE";
/// Set to `0`, `false`, `off` or `no` to stop echoing commands.
pub const PRINT_COMMANDS_VAR: &str = "LUS_PRINT_COMMANDS";
/// Sends diagnostics to a file instead of stderr.
pub const LOG_FILE_VAR: &str = "LUS_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub file: Option<PathBuf>,
    pub print_commands: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            file: None,
            print_commands: true,
            log_file: None,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();
        Settings {
            file: get(FILE_VAR).map(PathBuf::from),
            print_commands: get(PRINT_COMMANDS_VAR)
                .map_or(defaults.print_commands, |v| parse_switch(&v)),
            log_file: get(LOG_FILE_VAR).map(PathBuf::from),
        }
    }
}

fn parse_switch(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
