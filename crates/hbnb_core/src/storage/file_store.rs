//! JSON file-backed record store.
//!
//! # Responsibility
//! - Keep records keyed by `"ClassName.id"` in insertion order.
//! - Rewrite the backing file wholesale on `save()`.
//! - Rebuild the mapping from the backing file on `reload()`.
//!
//! # Invariants
//! - `objects` and `order` always hold the same key set.
//! - A missing backing file loads as an empty store.
//! - No locking: one process owns the file.

use super::{StorageError, StorageResult};
use crate::model::kind::RecordKind;
use crate::model::record::{Record, RecordId};
use log::{error, info};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// In-memory record mapping persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    objects: HashMap<String, Record>,
    order: Vec<String>,
}

impl FileStore {
    /// Creates an empty store bound to `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Creates a store bound to `path` and loads whatever the file holds.
    ///
    /// # Errors
    /// - Same as [`FileStore::reload`].
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let mut store = Self::new(path);
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live view of every `(key, record)` pair in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &Record)> + '_ {
        self.order.iter().filter_map(move |key| {
            self.objects
                .get(key)
                .map(|record| (key.as_str(), record))
        })
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.objects.get_mut(key)
    }

    /// Inserts `record` under its computed key.
    ///
    /// An existing record with the same key is replaced (last write wins) and
    /// keeps its original position. Returns the replaced record.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let key = record.key();
        let previous = self.objects.insert(key.clone(), record);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    /// Inserts `record` at `position` in the listing order, clamped to the
    /// end. Behaves like [`FileStore::insert`] when the key already exists.
    pub fn insert_at(&mut self, position: usize, record: Record) -> Option<Record> {
        let key = record.key();
        let previous = self.objects.insert(key.clone(), record);
        if previous.is_none() {
            let position = position.min(self.order.len());
            self.order.insert(position, key);
        }
        previous
    }

    /// Position of `key` in the listing order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|existing| existing == key)
    }

    /// Removes the record under `key`; no-op when absent.
    pub fn delete(&mut self, key: &str) -> Option<Record> {
        let removed = self.objects.remove(key);
        if removed.is_some() {
            self.order.retain(|existing| existing != key);
        }
        removed
    }

    /// Writes the full mapping to the backing file.
    ///
    /// # Errors
    /// - `Io` when the parent directory or the file cannot be written.
    /// - `Json` when serialization fails.
    pub fn save(&self) -> StorageResult<()> {
        let started_at = Instant::now();
        let mut document = Map::new();
        for (key, record) in self.all() {
            document.insert(key.to_string(), Value::Object(record.to_json_object()));
        }
        let payload = serde_json::to_string(&Value::Object(document))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        if let Err(source) = std::fs::write(&self.path, payload) {
            error!(
                "event=store_save module=storage status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                source
            );
            return Err(self.io_error(source));
        }

        info!(
            "event=store_save module=storage status=ok records={} duration_ms={}",
            self.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Replaces the in-memory mapping with the backing file's content.
    ///
    /// # Errors
    /// - `Io` for read failures other than a missing file.
    /// - `Json` when the file is not a JSON object.
    /// - `InvalidData` when an entry is malformed, its key does not match
    ///   the record it holds, or two entries share an id.
    pub fn reload(&mut self) -> StorageResult<()> {
        let started_at = Instant::now();
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.objects.clear();
                self.order.clear();
                info!("event=store_reload module=storage status=ok records=0 source=none");
                return Ok(());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let loaded = match parse_document(&raw) {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(
                    "event=store_reload module=storage status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        self.objects.clear();
        self.order.clear();
        for record in loaded {
            self.insert(record);
        }

        info!(
            "event=store_reload module=storage status=ok records={} duration_ms={}",
            self.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn parse_document(raw: &str) -> StorageResult<Vec<Record>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Map<String, Value> = serde_json::from_str(raw)?;
    let mut records = Vec::with_capacity(document.len());
    let mut seen_ids: HashSet<RecordId> = HashSet::with_capacity(document.len());
    for (key, value) in document {
        let Value::Object(object) = value else {
            return Err(StorageError::InvalidData(format!(
                "entry `{key}` is not a JSON object"
            )));
        };
        let record = Record::from_json_object(&object)
            .map_err(|err| StorageError::InvalidData(format!("entry `{key}`: {err}")))?;
        if !key_matches(&key, &record) {
            return Err(StorageError::InvalidData(format!(
                "entry `{key}` holds record `{}`",
                record.key()
            )));
        }
        if !seen_ids.insert(record.id) {
            return Err(StorageError::InvalidData(format!(
                "duplicate id `{}` in entry `{key}`",
                record.id
            )));
        }
        records.push(record);
    }
    Ok(records)
}

/// Compares the parsed class and id, so `User.<ID>` with an uppercase or
/// braced UUID still names the same record.
fn key_matches(key: &str, record: &Record) -> bool {
    let Some((class_name, id)) = key.split_once('.') else {
        return false;
    };
    RecordKind::from_name(class_name) == Some(record.kind())
        && RecordId::parse_str(id).map_or(false, |id| id == record.id)
}
