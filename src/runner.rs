//! Top-level driver that owns the execution state of a run

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use log::debug;

use crate::config_file::LusFile;
use crate::context::ExecutionContext;
use crate::node::ConfigNode;
use crate::style::{COMMAND, Palette};
use crate::unwind::Unwind;

/// Resolves CLI arguments against a [`LusFile`] and executes the matched statements.
///
/// The interpreter, chain evaluator and resolver are implemented as methods
/// on this type in their own modules.
pub struct Runner<'a> {
    pub(crate) lusfile: &'a LusFile,
    pub ctx: ExecutionContext,
    pub(crate) invocation_directory: PathBuf,
    pub(crate) palette: Palette,
}

impl<'a> Runner<'a> {
    /// Create a runner executing in the task file's directory.
    #[must_use]
    pub fn new(lusfile: &'a LusFile, invocation_directory: PathBuf) -> Self {
        Runner {
            lusfile,
            ctx: ExecutionContext::new(lusfile.directory()),
            invocation_directory,
            palette: Palette::stdout(),
        }
    }

    #[must_use]
    pub fn with_print_commands(mut self, print_commands: bool) -> Self {
        self.ctx.print_commands = print_commands;
        self
    }

    /// Resolve `args` against the root of the task file.
    ///
    /// A tree without any subcommands treats its root statements as the default
    /// branch, so extra arguments are accepted there.
    ///
    /// # Errors
    ///
    /// Returns the `Unwind` that stopped the run early.
    pub fn run(&mut self, args: &[String]) -> Result<(), Unwind> {
        let lusfile = self.lusfile;
        if lusfile.nodes.is_empty() {
            return Ok(());
        }
        let strict = lusfile.nodes.iter().any(ConfigNode::is_subcommand);
        debug!("Resolving {args:?} against {}", lusfile.path.display());
        self.resolve_root(args, strict)
    }

    /// Echo a command line when command printing is enabled.
    pub(crate) fn print_command(&self, tokens: &[String]) {
        if self.ctx.print_commands {
            println!("{}", self.palette.paint(COMMAND, &quote_join(tokens)));
        }
    }
}

/// Shell-quote and join `tokens` with spaces.
#[must_use]
pub fn quote_join(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| shell_escape::unix::escape(t.as_str().into()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Restores the runner's working directory when dropped.
pub(crate) struct DirectoryGuard<'r, 'a> {
    runner: &'r mut Runner<'a>,
    saved: PathBuf,
}

impl<'r, 'a> DirectoryGuard<'r, 'a> {
    pub(crate) fn new(runner: &'r mut Runner<'a>) -> Self {
        let saved = runner.ctx.cwd.clone();
        DirectoryGuard { runner, saved }
    }
}

impl<'a> Deref for DirectoryGuard<'_, 'a> {
    type Target = Runner<'a>;

    fn deref(&self) -> &Self::Target {
        self.runner
    }
}

impl DerefMut for DirectoryGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.runner
    }
}

impl Drop for DirectoryGuard<'_, '_> {
    fn drop(&mut self) {
        self.runner.ctx.cwd = std::mem::take(&mut self.saved);
    }
}
