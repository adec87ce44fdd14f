//! Core implementation of the Lus task runner
//!
//! Lus reads a `lus.kdl` task file describing named subcommands and the
//! shell-like statements each one runs. CLI arguments are matched against that
//! tree and the resolved statements are executed as processes, with a small
//! set of builtins (`cd`, `test`, `export`, `set`, `exit`, `lus`) and `&&`/`||`
//! chaining interpreted in-process.

use std::path::PathBuf;

use crate::config_file::LusFile;
use crate::runner::Runner;
use crate::unwind::Unwind;

pub mod chain;
pub mod completions;
pub mod config_file;
pub mod context;
pub mod environment;
pub mod expand;
pub mod help;
pub(crate) mod install_hint;
pub mod interpreter;
pub mod logger;
pub mod node;
pub mod resolver;
pub mod runner;
pub mod settings;
pub mod style;
pub mod unwind;

/// Resolve and run `args` against `lusfile`.
///
/// # Errors
///
/// Returns the `Unwind` that stopped the run; see [`Runner::run`].
pub fn run(
    lusfile: &LusFile,
    args: &[String],
    invocation_directory: PathBuf,
    print_commands: bool,
) -> Result<(), Unwind> {
    Runner::new(lusfile, invocation_directory)
        .with_print_commands(print_commands)
        .run(args)
}
