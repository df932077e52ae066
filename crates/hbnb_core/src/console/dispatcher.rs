//! Verb routing and handlers.
//!
//! # Responsibility
//! - Normalize, tokenize and route one line to its verb handler.
//! - Drive the read-eval-print loop over any `BufRead`/`Write` pair.
//!
//! # Invariants
//! - Argument checks run in order: class, class membership, id, record,
//!   attribute, value.
//! - Attribute names and values are stored as given; no coercion.

use super::syntax::{normalize_line, tokenize};
use super::{CommandError, CommandResult, MissingArgument};
use crate::model::kind::RecordKind;
use crate::model::record::{record_key, Record, RecordError};
use crate::storage::FileStore;
use log::{debug, info, warn};
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

/// Prompt printed before each line in interactive mode.
pub const PROMPT: &str = "(hbnb) ";

/// Command keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Update,
    Count,
    Help,
    Quit,
    Eof,
}

static VERBS: &[(&str, Verb, &str)] = &[
    (
        "all",
        Verb::All,
        "Usage: all [ClassName]\nPrints all instances, or all instances of ClassName.",
    ),
    (
        "count",
        Verb::Count,
        "Usage: count <ClassName>\nPrints the number of instances of ClassName.",
    ),
    (
        "create",
        Verb::Create,
        "Usage: create <ClassName>\nCreates a new instance, saves it and prints its id.",
    ),
    (
        "destroy",
        Verb::Destroy,
        "Usage: destroy <ClassName> <id>\nDeletes an instance and saves the change.",
    ),
    (
        "help",
        Verb::Help,
        "Usage: help [command]\nLists commands or describes one.",
    ),
    ("quit", Verb::Quit, "Quit command to exit the program."),
    (
        "show",
        Verb::Show,
        "Usage: show <ClassName> <id>\nPrints the string representation of an instance.",
    ),
    (
        "update",
        Verb::Update,
        "Usage: update <ClassName> <id> <attribute> \"<value>\"\nSets one attribute and saves the change.",
    ),
    ("EOF", Verb::Eof, "End of input exits the program."),
];

impl Verb {
    pub fn from_name(name: &str) -> Option<Self> {
        VERBS
            .iter()
            .find(|(entry, _, _)| *entry == name)
            .map(|(_, verb, _)| *verb)
    }

    pub fn name(self) -> &'static str {
        VERBS
            .iter()
            .find(|(_, verb, _)| *verb == self)
            .map(|(name, _, _)| *name)
            .unwrap_or("")
    }

    fn usage(self) -> &'static str {
        VERBS
            .iter()
            .find(|(_, verb, _)| *verb == self)
            .map(|(_, _, usage)| *usage)
            .unwrap_or("")
    }
}

/// Result of one successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Nothing to print (empty line, successful destroy/update).
    Silent,
    Text(String),
    /// Record representations, printed as one bracketed list.
    Records(Vec<String>),
    /// Stop the loop.
    Quit,
}

impl Display for CommandOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silent | Self::Quit => Ok(()),
            Self::Text(text) => write!(f, "{text}"),
            Self::Records(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", serde_json::Value::String(item.clone()))?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Line-oriented command interpreter that owns the record store.
pub struct Console {
    store: FileStore,
}

impl Console {
    /// Takes ownership of `store` for the lifetime of the shell.
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Hands the store back at shutdown.
    pub fn into_store(self) -> FileStore {
        self.store
    }

    /// Runs one input line to completion.
    ///
    /// # Errors
    /// - `MissingArgument`, `UnknownClass`, `NotFound`, `ReadOnlyAttribute`
    ///   for invalid input; the store is left untouched.
    /// - `UnknownCommand` when the first token is not a verb.
    /// - `Storage` when persisting a mutation fails; the mutation is undone.
    pub fn execute(&mut self, line: &str) -> CommandResult<CommandOutput> {
        let canonical = normalize_line(line);
        let tokens = tokenize(&canonical);
        let Some((verb_name, args)) = tokens.split_first() else {
            return Ok(CommandOutput::Silent);
        };
        let verb = Verb::from_name(verb_name)
            .ok_or_else(|| CommandError::UnknownCommand(line.trim().to_string()))?;

        let result = match verb {
            Verb::Create => self.create(args),
            Verb::Show => self.show(args),
            Verb::Destroy => self.destroy(args),
            Verb::All => self.all(args),
            Verb::Update => self.update(args),
            Verb::Count => self.count(args),
            Verb::Help => Ok(help(args)),
            Verb::Quit | Verb::Eof => Ok(CommandOutput::Quit),
        };

        match &result {
            Ok(_) => debug!(
                "event=command module=console status=ok verb={}",
                verb.name()
            ),
            Err(CommandError::Storage(err)) => warn!(
                "event=command module=console status=error verb={} error_code=store_save_failed error={}",
                verb.name(),
                err
            ),
            Err(_) => debug!(
                "event=command module=console status=rejected verb={}",
                verb.name()
            ),
        }
        result
    }

    /// Reads lines from `input` until `quit`, `EOF` or end of input.
    ///
    /// Command output and command errors both go to `output`; only I/O
    /// failures on the streams themselves end the loop with an error.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        output: &mut W,
        interactive: bool,
    ) -> io::Result<()> {
        info!(
            "event=shell_start module=console status=ok records={} interactive={}",
            self.store.len(),
            interactive
        );
        let mut line = String::new();
        loop {
            if interactive {
                write!(output, "{PROMPT}")?;
                output.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                if interactive {
                    writeln!(output)?;
                }
                break;
            }

            if !self.handle_line(&line, output)? {
                break;
            }
        }
        info!("event=shell_stop module=console status=ok");
        Ok(())
    }

    /// Executes `line` and writes its output or error message to `output`.
    ///
    /// Returns `false` once the line asked the shell to stop.
    pub fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<bool> {
        match self.execute(line) {
            Ok(CommandOutput::Quit) => return Ok(false),
            Ok(CommandOutput::Silent) => {}
            Ok(out) => writeln!(output, "{out}")?,
            Err(err) => writeln!(output, "{err}")?,
        }
        Ok(true)
    }

    fn create(&mut self, args: &[String]) -> CommandResult<CommandOutput> {
        let kind = required_kind(args)?;
        let record = Record::new(kind);
        let id = record.id.to_string();
        let key = record.key();
        self.store.insert(record);
        self.persist(|store| {
            store.delete(&key);
        })?;
        Ok(CommandOutput::Text(id))
    }

    fn show(&mut self, args: &[String]) -> CommandResult<CommandOutput> {
        let key = self.existing_key(args)?;
        let record = self
            .store
            .get(&key)
            .ok_or_else(|| CommandError::NotFound(key.clone()))?;
        Ok(CommandOutput::Text(record.to_string()))
    }

    fn destroy(&mut self, args: &[String]) -> CommandResult<CommandOutput> {
        let key = self.existing_key(args)?;
        let position = self.store.position(&key).unwrap_or_default();
        let Some(removed) = self.store.delete(&key) else {
            return Err(CommandError::NotFound(key));
        };
        self.persist(move |store| {
            store.insert_at(position, removed);
        })?;
        Ok(CommandOutput::Silent)
    }

    fn all(&mut self, args: &[String]) -> CommandResult<CommandOutput> {
        let filter = match args.first() {
            Some(name) => Some(
                RecordKind::from_name(name)
                    .ok_or_else(|| CommandError::UnknownClass(name.clone()))?,
            ),
            None => None,
        };
        let items = self
            .store
            .all()
            .filter(|(_, record)| filter.map_or(true, |kind| record.kind() == kind))
            .map(|(_, record)| record.to_string())
            .collect();
        Ok(CommandOutput::Records(items))
    }

    fn update(&mut self, args: &[String]) -> CommandResult<CommandOutput> {
        let key = self.existing_key(args)?;
        let attribute = args.get(2).ok_or(MissingArgument::AttributeName)?;
        let value = args.get(3).ok_or(MissingArgument::Value)?;

        let record = self
            .store
            .get_mut(&key)
            .ok_or_else(|| CommandError::NotFound(key.clone()))?;
        let snapshot = record.clone();
        if let Err(RecordError::ReadOnlyAttribute(name)) =
            record.set_attribute(attribute, value.as_str())
        {
            return Err(CommandError::ReadOnlyAttribute(name));
        }
        record.touch();
        self.persist(move |store| {
            store.insert(snapshot);
        })?;
        Ok(CommandOutput::Silent)
    }

    fn count(&mut self, args: &[String]) -> CommandResult<CommandOutput> {
        let kind = required_kind(args)?;
        let total = self
            .store
            .all()
            .filter(|(_, record)| record.kind() == kind)
            .count();
        Ok(CommandOutput::Text(total.to_string()))
    }

    /// Saves the store, undoing the in-memory mutation with `rollback` when
    /// the write fails so memory and disk stay in step.
    fn persist(&mut self, rollback: impl FnOnce(&mut FileStore)) -> CommandResult<()> {
        if let Err(err) = self.store.save() {
            rollback(&mut self.store);
            return Err(err.into());
        }
        Ok(())
    }

    /// Validates `<ClassName> <id>` and returns the key of an existing record.
    fn existing_key(&self, args: &[String]) -> CommandResult<String> {
        let kind = required_kind(args)?;
        let id = args.get(1).ok_or(MissingArgument::InstanceId)?;
        let key = record_key(kind, id);
        if self.store.get(&key).is_none() {
            return Err(CommandError::NotFound(key));
        }
        Ok(key)
    }
}

fn required_kind(args: &[String]) -> CommandResult<RecordKind> {
    let name = args.first().ok_or(MissingArgument::ClassName)?;
    RecordKind::from_name(name).ok_or_else(|| CommandError::UnknownClass(name.clone()))
}

fn help(args: &[String]) -> CommandOutput {
    match args.first() {
        None => {
            let names: Vec<&str> = VERBS.iter().map(|(name, _, _)| *name).collect();
            CommandOutput::Text(format!(
                "Documented commands (type help <topic>):\n{}",
                names.join("  ")
            ))
        }
        Some(topic) => match Verb::from_name(topic) {
            Some(verb) => CommandOutput::Text(verb.usage().to_string()),
            None => CommandOutput::Text(format!("*** No help on {topic}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandOutput, Verb};

    #[test]
    fn verbs_resolve_by_exact_name() {
        assert_eq!(Verb::from_name("create"), Some(Verb::Create));
        assert_eq!(Verb::from_name("EOF"), Some(Verb::Eof));
        assert_eq!(Verb::from_name("Create"), None);
        assert_eq!(Verb::Update.name(), "update");
    }

    #[test]
    fn records_output_renders_as_bracketed_list() {
        let output = CommandOutput::Records(vec!["[User] (1) {}".to_string(), "b".to_string()]);
        assert_eq!(output.to_string(), r#"["[User] (1) {}", "b"]"#);
        assert_eq!(CommandOutput::Records(Vec::new()).to_string(), "[]");
    }
}
