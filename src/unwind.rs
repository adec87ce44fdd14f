//! Typed non-local exits of the resolver and interpreter

use std::fmt;

use thiserror::Error;

use crate::interpreter::ExecError;
use crate::resolver::MatchError;

/// Status of a statement or a terminated scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Code(i32),
    /// Non-numeric `exit` argument, passed through unparsed.
    Message(String),
}

impl Status {
    pub const SUCCESS: Status = Status::Code(0);

    #[must_use]
    pub fn is_success(&self) -> bool {
        *self == Status::SUCCESS
    }

    /// Parse the operand of an `exit` statement.
    #[must_use]
    pub fn parse(operand: Option<&str>) -> Status {
        match operand {
            None => Status::SUCCESS,
            Some(text) => text
                .trim()
                .parse()
                .map_or_else(|_| Status::Message(text.to_string()), Status::Code),
        }
    }

    /// Process exit code for this status, wrapped into `0..=255`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Status::Code(code) => u8::try_from(code.rem_euclid(256)).unwrap_or(1),
            Status::Message(_) => 1,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Code(code) => write!(f, "{code}"),
            Status::Message(message) => f.write_str(message),
        }
    }
}

/// Why a resolution scope stopped early. `Ok(())` means it ran to the end.
#[derive(Error, Debug)]
pub enum Unwind {
    #[error("terminated with status {0}")]
    Terminate(Status),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl Unwind {
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Unwind::Terminate(status) => status.exit_code(),
            Unwind::Match(_) | Unwind::Exec(_) => 1,
        }
    }
}
