//! Durable record storage.
//!
//! # Responsibility
//! - Hold the in-memory `"ClassName.id" -> Record` mapping.
//! - Serialize the whole mapping to one JSON file and load it back.
//!
//! # Invariants
//! - Every key equals `Record::key()` of the record stored under it.
//! - Iteration order is insertion order, on disk and in memory.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file_store;

pub use file_store::FileStore;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    /// File parsed as JSON but does not describe a valid store.
    InvalidData(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "store file `{}`: {source}", path.display()),
            Self::Json(err) => write!(f, "store file is not valid JSON: {err}"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
