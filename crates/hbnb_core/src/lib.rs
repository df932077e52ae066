//! Core of the hbnb record shell.
//! Record model, JSON file store and command dispatcher.

pub mod config;
pub mod console;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::ShellConfig;
pub use console::{
    CommandError, CommandOutput, CommandResult, Console, MissingArgument, Verb, PROMPT,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::kind::{RecordBody, RecordKind};
pub use model::record::{Record, RecordError, RecordId, RecordResult};
pub use storage::{FileStore, StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
