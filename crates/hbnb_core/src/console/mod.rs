//! Command dispatcher for the record shell.
//!
//! # Responsibility
//! - Turn one input line into one store operation and its output.
//! - Report user-input errors as fixed messages without ending the loop.
//!
//! # Invariants
//! - Each line runs to completion before the next one is read.
//! - Unknown classes are rejected before the store is read or written.
//! - Every successful mutation is persisted before the command returns.

use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod dispatcher;
pub mod syntax;

pub use dispatcher::{CommandOutput, Console, Verb, PROMPT};

pub type CommandResult<T> = Result<T, CommandError>;

/// Which positional argument a command was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArgument {
    ClassName,
    InstanceId,
    AttributeName,
    Value,
}

/// Per-command failure. Never ends the shell loop.
#[derive(Debug)]
pub enum CommandError {
    MissingArgument(MissingArgument),
    UnknownClass(String),
    /// No record under the given `"ClassName.id"` key.
    NotFound(String),
    ReadOnlyAttribute(String),
    UnknownCommand(String),
    Storage(StorageError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArgument(MissingArgument::ClassName) => {
                write!(f, "** class name missing **")
            }
            Self::MissingArgument(MissingArgument::InstanceId) => {
                write!(f, "** instance id missing **")
            }
            Self::MissingArgument(MissingArgument::AttributeName) => {
                write!(f, "** attribute name missing **")
            }
            Self::MissingArgument(MissingArgument::Value) => write!(f, "** value missing **"),
            Self::UnknownClass(_) => write!(f, "** class doesn't exist **"),
            Self::NotFound(_) => write!(f, "** no instance found **"),
            Self::ReadOnlyAttribute(_) => write!(f, "** attribute can't be updated **"),
            Self::UnknownCommand(line) => write!(f, "*** Unknown syntax: {line}"),
            Self::Storage(err) => write!(f, "** unable to save store: {err} **"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CommandError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<MissingArgument> for CommandError {
    fn from(value: MissingArgument) -> Self {
        Self::MissingArgument(value)
    }
}
