//! Builtin vocabulary and external program execution for a single statement

use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

use log::{debug, trace};
use thiserror::Error;

use crate::expand::ExpandError;
use crate::install_hint;
use crate::node::Properties;
use crate::runner::{DirectoryGuard, Runner};
use crate::unwind::{Status, Unwind};

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{0} not implemented")]
    Unsupported(String),
    #[error("`{0}` is missing an operand")]
    MissingOperand(String),
    #[error("No such file or directory: {}", .path.display())]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No such file or directory: {program}")]
    ProgramNotFound { program: String },
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("empty command around `{0}`")]
    EmptySegment(String),
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

/// Result of a statement that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Process-style status, drives error propagation.
    pub status: Status,
    /// Boolean outcome, drives `&&`/`||` branching.
    pub condition: bool,
}

impl Evaluation {
    pub const TRUE: Evaluation = Evaluation {
        status: Status::SUCCESS,
        condition: true,
    };
    pub const FALSE: Evaluation = Evaluation {
        status: Status::SUCCESS,
        condition: false,
    };

    #[must_use]
    pub fn from_status(status: Status) -> Self {
        let condition = status.is_success();
        Evaluation { status, condition }
    }
}

impl Runner<'_> {
    /// Execute one resolved command.
    ///
    /// # Errors
    ///
    /// Returns `Unwind::Terminate` for `exit` and failed `test -f`/`test -d`,
    /// `Unwind::Exec` for builtin misuse and OS failures, and whatever a nested
    /// `lus` invocation unwinds with.
    pub fn execute(
        &mut self,
        tokens: &[String],
        properties: &Properties,
    ) -> Result<Evaluation, Unwind> {
        let Some((program, rest)) = tokens.split_first() else {
            return Ok(Evaluation::TRUE);
        };
        trace!("Executing {tokens:?}");
        match program.as_str() {
            "exit" => Err(Unwind::Terminate(Status::parse(
                rest.first().map(String::as_str),
            ))),
            "cd" => self.change_directory(tokens),
            "test" => Self::test(tokens, &self.ctx.cwd),
            "lus" => self.nested(rest),
            "export" => Ok(self.export(tokens, properties)),
            "set" => self.set(rest),
            _ if program.contains(std::path::is_separator)
                && !Path::new(program).is_absolute() =>
            {
                self.print_command(tokens);
                let resolved = self.ctx.cwd.join(program);
                self.spawn(program, ProcessCommand::new(resolved), rest)
            }
            _ => self.external(program, rest),
        }
    }

    fn change_directory(&mut self, tokens: &[String]) -> Result<Evaluation, Unwind> {
        self.print_command(tokens);
        let target = tokens
            .get(1)
            .ok_or_else(|| ExecError::MissingOperand("cd".to_string()))?;
        if tokens.len() == 2 && target == "-" {
            std::mem::swap(&mut self.ctx.cwd, &mut self.ctx.previous_dir);
            debug!("cd - to {}", self.ctx.cwd.display());
            return Ok(Evaluation::TRUE);
        }
        let path = self.ctx.cwd.join(target);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ExecError::DirectoryNotFound {
                    path,
                    source: std::io::Error::from(std::io::ErrorKind::NotADirectory),
                }
                .into());
            }
            Err(source) => return Err(ExecError::DirectoryNotFound { path, source }.into()),
        }
        debug!("cd to {}", path.display());
        self.ctx.previous_dir = std::mem::replace(&mut self.ctx.cwd, path);
        Ok(Evaluation::TRUE)
    }

    fn test(tokens: &[String], cwd: &Path) -> Result<Evaluation, Unwind> {
        let [_, flag, operand, ..] = tokens else {
            return Err(ExecError::Unsupported(format!("test {:?}", &tokens[1..])).into());
        };
        match flag.as_str() {
            "-f" | "-d" => {
                let path = cwd.join(operand);
                let ok = if flag == "-f" { path.is_file() } else { path.is_dir() };
                if ok {
                    Ok(Evaluation::TRUE)
                } else {
                    Err(Unwind::Terminate(Status::Code(1)))
                }
            }
            "-z" if operand.is_empty() => Ok(Evaluation::TRUE),
            "-n" if !operand.is_empty() => Ok(Evaluation::TRUE),
            "-z" | "-n" => Ok(Evaluation::FALSE),
            _ => Err(ExecError::Unsupported(format!("test {:?}", &tokens[1..])).into()),
        }
    }

    fn nested(&mut self, args: &[String]) -> Result<Evaluation, Unwind> {
        let mut guard = DirectoryGuard::new(self);
        match guard.run(args) {
            Ok(()) => Ok(Evaluation::TRUE),
            Err(Unwind::Terminate(status)) if status.is_success() => Ok(Evaluation::TRUE),
            Err(e) => Err(e),
        }
    }

    fn export(&mut self, tokens: &[String], properties: &Properties) -> Evaluation {
        let pairs: Vec<(String, String)> = properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        let mut echoed = tokens.to_vec();
        echoed.extend(pairs.iter().map(|(k, v)| format!("{k}={v}")));
        self.print_command(&echoed);
        debug!("export {pairs:?}");
        self.ctx.exported.extend(pairs);
        Evaluation::TRUE
    }

    fn set(&mut self, rest: &[String]) -> Result<Evaluation, Unwind> {
        match rest.first().map(String::as_str) {
            Some("-x") => self.ctx.print_commands = true,
            Some("+x") => self.ctx.print_commands = false,
            Some(other) => return Err(ExecError::Unsupported(format!("set {other}")).into()),
            None => return Err(ExecError::MissingOperand("set".to_string()).into()),
        }
        Ok(Evaluation::TRUE)
    }

    fn external(&mut self, program: &str, rest: &[String]) -> Result<Evaluation, Unwind> {
        let search_path = self.ctx.search_path();
        let resolved = match which::which_in(program, search_path.as_ref(), &self.ctx.cwd) {
            Ok(path) => path,
            Err(_) => {
                install_hint::offer_install(self, program);
                which::which_in(program, search_path.as_ref(), &self.ctx.cwd).map_err(|_| {
                    ExecError::ProgramNotFound {
                        program: program.to_string(),
                    }
                })?
            }
        };
        let mut echoed = vec![program.to_string()];
        echoed.extend_from_slice(rest);
        self.print_command(&echoed);
        self.spawn(program, platform_command(&resolved), rest)
    }

    /// Run `command` with `args` in the current directory and exported
    /// environment, blocking until it exits.
    pub(crate) fn spawn(
        &self,
        program: &str,
        mut command: ProcessCommand,
        args: &[String],
    ) -> Result<Evaluation, Unwind> {
        let status = command
            .args(args)
            .current_dir(&self.ctx.cwd)
            .envs(&self.ctx.exported)
            .status()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    ExecError::ProgramNotFound {
                        program: program.to_string(),
                    }
                } else {
                    ExecError::Spawn {
                        program: program.to_string(),
                        source,
                    }
                }
            })?;
        let code = exit_code_of(status);
        debug!("{program} exited with {code}");
        Ok(Evaluation::from_status(Status::Code(code)))
    }
}

#[cfg(windows)]
fn platform_command(resolved: &Path) -> ProcessCommand {
    // Through cmd.exe so .bat/.cmd scripts work.
    let mut command = ProcessCommand::new("cmd");
    command.arg("/C").arg(resolved);
    command
}

#[cfg(not(windows))]
fn platform_command(resolved: &Path) -> ProcessCommand {
    ProcessCommand::new(resolved)
}

#[cfg(unix)]
fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
