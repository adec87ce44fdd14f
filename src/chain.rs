//! `&&`/`||` short-circuit evaluation of a statement

use log::trace;

use crate::interpreter::{Evaluation, ExecError};
use crate::node::Properties;
use crate::runner::Runner;
use crate::unwind::{Status, Unwind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn parse(token: &str) -> Option<Operator> {
        match token {
            "&&" => Some(Operator::And),
            "||" => Some(Operator::Or),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }
}

/// Split a command at its operators.
///
/// Returns the segments and the operator following each segment but the last.
///
/// # Errors
///
/// Returns `ExecError::EmptySegment` when an operator starts or ends the
/// command, or two operators are adjacent.
pub fn split_chain(tokens: &[String]) -> Result<(Vec<&[String]>, Vec<Operator>), ExecError> {
    let mut segments = Vec::new();
    let mut operators = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if let Some(op) = Operator::parse(token) {
            if i == start {
                return Err(ExecError::EmptySegment(op.as_str().to_string()));
            }
            segments.push(&tokens[start..i]);
            operators.push(op);
            start = i + 1;
        }
    }
    if start == tokens.len() {
        let last = operators.last().map_or("", |op| op.as_str());
        return Err(ExecError::EmptySegment(last.to_string()));
    }
    segments.push(&tokens[start..]);
    Ok((segments, operators))
}

impl Runner<'_> {
    /// Run a resolved statement, chained or not.
    ///
    /// A non-zero final status terminates the enclosing scope with that status.
    ///
    /// # Errors
    ///
    /// Returns `Unwind::Terminate` for non-zero statuses and `exit`, and
    /// propagates match and execution errors untouched.
    pub fn run_statement(
        &mut self,
        tokens: &[String],
        properties: &Properties,
    ) -> Result<(), Unwind> {
        if tokens.iter().any(|t| Operator::parse(t).is_some()) {
            return self.run_chain(tokens, properties);
        }
        let evaluation = self.execute(tokens, properties)?;
        if evaluation.status.is_success() {
            Ok(())
        } else {
            Err(Unwind::Terminate(evaluation.status))
        }
    }

    fn run_chain(&mut self, tokens: &[String], properties: &Properties) -> Result<(), Unwind> {
        let (segments, operators) = split_chain(tokens)?;
        let mut last_status = Status::SUCCESS;

        for (i, segment) in segments.iter().enumerate() {
            let Evaluation { status, condition } = match self.execute(segment, properties) {
                Ok(evaluation) => evaluation,
                Err(Unwind::Terminate(status)) if segment[0] != "exit" => {
                    Evaluation::from_status(status)
                }
                Err(e) => return Err(e),
            };
            trace!("Segment {segment:?}: status {status}, condition {condition}");

            match operators.get(i) {
                Some(Operator::And) if !condition => {
                    if status.is_success() {
                        return Ok(());
                    }
                    return Err(Unwind::Terminate(status));
                }
                Some(Operator::Or) if condition => return Ok(()),
                _ => {}
            }
            last_status = status;
        }

        if last_status.is_success() {
            Ok(())
        } else {
            Err(Unwind::Terminate(last_status))
        }
    }
}
