//! Mutable state shared by every statement of a run

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Working directory, echo flag and exported variables of a run.
///
/// Spawned programs receive `cwd` as their working directory and `exported`
/// on top of the inherited process environment.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub cwd: PathBuf,
    pub previous_dir: PathBuf,
    pub print_commands: bool,
    pub exported: BTreeMap<String, String>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        ExecutionContext {
            previous_dir: cwd.clone(),
            cwd,
            print_commands: true,
            exported: BTreeMap::new(),
        }
    }

    /// `PATH` as seen by spawned programs.
    #[must_use]
    pub fn search_path(&self) -> Option<OsString> {
        self.exported
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"))
    }
}
