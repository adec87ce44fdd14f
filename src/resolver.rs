//! Recursive matching of CLI arguments against the task tree

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use thiserror::Error;

use crate::environment::Environment;
use crate::expand::expand;
use crate::help::{compute_aliases, render_listing};
use crate::interpreter::ExecError;
use crate::node::{ConfigNode, Value};
use crate::runner::{Runner, quote_join};
use crate::unwind::Unwind;

/// Arguments that could not be matched against the task tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Duplicate node name '{0}'")]
    DuplicateName(String),
    #[error("Unexpected argument: {}", quote_join(.0))]
    UnexpectedArgument(Vec<String>),
    #[error(
        "Unknown subcommand {} not one of: {}",
        shell_escape::unix::escape(.subcommand.as_str().into()),
        .available.join(", ")
    )]
    UnknownSubcommand {
        subcommand: String,
        available: Vec<String>,
    },
}

/// Split leading flags from the rest of the arguments.
///
/// Only a prefix of `-`-tokens counts as flags; everything from the first
/// positional token on, later flags included, is returned as the second list.
#[must_use]
pub fn split_flags(args: &[String]) -> (Vec<String>, Vec<String>) {
    let split = args
        .iter()
        .position(|arg| !arg.starts_with('-'))
        .unwrap_or(args.len());
    (args[..split].to_vec(), args[split..].to_vec())
}

/// Names that can be selected as subcommands at this level.
#[must_use]
pub fn available_subcommands(nodes: &[ConfigNode]) -> Vec<String> {
    nodes
        .iter()
        .filter(|n| n.is_subcommand())
        .map(|n| n.name.clone())
        .collect()
}

fn check_duplicates(nodes: &[ConfigNode]) -> Result<(), MatchError> {
    let mut seen = HashSet::new();
    for node in nodes
        .iter()
        .filter(|n| !n.is_statement() && !n.children.is_empty())
    {
        if !seen.insert(node.name.as_str()) {
            return Err(MatchError::DuplicateName(node.name.clone()));
        }
    }
    Ok(())
}

fn remove_first(args: &mut Vec<String>, value: &str) {
    if let Some(pos) = args.iter().position(|a| a == value) {
        args.remove(pos);
    }
}

impl Runner<'_> {
    pub(crate) fn resolve_root(&mut self, args: &[String], strict: bool) -> Result<(), Unwind> {
        let lusfile = self.lusfile;
        self.resolve(&lusfile.nodes, args, strict, true, BTreeMap::new())
    }

    /// Match `args` against `nodes`, executing statements on the way.
    ///
    /// `root` marks the top level of the task file, which is the only level
    /// that sees `invocation_directory` and top-level comments. `locals` are
    /// the property-only statement values inherited from the parent frame.
    ///
    /// # Errors
    ///
    /// Returns `Unwind::Match` for duplicate names and unhandled arguments when
    /// `check_if_args_handled` is set, and propagates everything statements
    /// unwind with.
    pub fn resolve(
        &mut self,
        nodes: &[ConfigNode],
        args: &[String],
        check_if_args_handled: bool,
        root: bool,
        locals: BTreeMap<String, String>,
    ) -> Result<(), Unwind> {
        let (flags, remaining_args_without_flags) = split_flags(args);
        let mut remaining_args = args.to_vec();
        let subcommand = remaining_args_without_flags
            .first()
            .cloned()
            .unwrap_or_default();

        let mut env = Environment::new(args.join(" "))
            .with("subcommand", subcommand.as_str())
            .with("flags", flags.join(" "))
            .with_locals(locals);
        if root {
            env = env.with(
                "invocation_directory",
                self.invocation_directory.to_string_lossy(),
            );
        }

        let available = available_subcommands(nodes);

        if flags.iter().any(|f| f == "-l") {
            let listing = if root {
                render_listing(
                    nodes,
                    &self.lusfile.comments,
                    &self.lusfile.aliases,
                    self.palette,
                )
            } else {
                render_listing(nodes, &HashMap::new(), &compute_aliases(nodes), self.palette)
            };
            print!("{listing}");
            return Ok(());
        }

        check_duplicates(nodes)?;

        let mut subcommand_executed = false;
        for child in nodes {
            if let Some(tokens) = child.statement_tokens() {
                if tokens.is_empty() {
                    env.set_locals(
                        child
                            .properties
                            .iter()
                            .map(|(k, v)| (k.clone(), v.to_string())),
                    );
                    continue;
                }
                let command = self.build_command(&tokens, &remaining_args, &mut env)?;
                if subcommand_executed
                    && command.len() > 1
                    && command[0] == "lus"
                    && command[1] == subcommand
                {
                    debug!("Skipping `lus {subcommand}`, already ran");
                    continue;
                }
                self.run_statement(&command, &child.properties)?;
                continue;
            }

            if child.name.is_empty() {
                continue;
            }
            if child.name == subcommand {
                debug!("Matched subcommand {subcommand}");
                remove_first(&mut remaining_args, &subcommand);
                match self.resolve(
                    &child.children,
                    &remaining_args,
                    true,
                    false,
                    env.locals().clone(),
                ) {
                    Ok(()) => {}
                    Err(Unwind::Terminate(status)) if status.is_success() => {}
                    Err(e) => return Err(e),
                }
                subcommand_executed = true;
                remaining_args.clear();
            } else if flags.contains(&child.name) {
                debug!("Matched flag {}", child.name);
                remove_first(&mut remaining_args, &child.name);
                self.resolve(
                    &child.children,
                    &remaining_args_without_flags,
                    false,
                    false,
                    env.locals().clone(),
                )?;
            }
        }

        if check_if_args_handled && !remaining_args.is_empty() && !env.args_used() {
            if available.is_empty() {
                return Err(MatchError::UnexpectedArgument(remaining_args).into());
            }
            return Err(MatchError::UnknownSubcommand {
                subcommand,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Turn statement tokens into a command, expanding variables.
    ///
    /// A bare `$args` token splices in the remaining arguments; with none left
    /// a `test` command still gets an empty operand.
    fn build_command(
        &self,
        tokens: &[Value],
        remaining_args: &[String],
        env: &mut Environment,
    ) -> Result<Vec<String>, Unwind> {
        let mut command: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.as_str() == Some("$args") {
                env.mark_args_used();
                if !remaining_args.is_empty() {
                    command.extend_from_slice(remaining_args);
                } else if command.first().is_some_and(|c| c == "test") {
                    command.push(String::new());
                }
                continue;
            }
            let expanded = expand(&token.to_string(), &mut env.scope(&self.ctx.exported))
                .map_err(ExecError::from)?;
            command.push(expanded);
        }
        Ok(command)
    }
}
