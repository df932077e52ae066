//! Record domain model.
//!
//! # Responsibility
//! - Define the identity/lifecycle shape shared by every record kind.
//! - Map records to and from their flat JSON object form.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - `id`, `created_at`, `updated_at` and `__class__` are read-only through
//!   `set_attribute`.
//! - Timestamps carry microsecond precision so they survive a JSON round-trip.

use crate::model::kind::{RecordBody, RecordKind};
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a record, unique across all kinds.
pub type RecordId = Uuid;

/// JSON key carrying the record's class name.
pub const CLASS_TAG: &str = "__class__";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const READ_ONLY_ATTRIBUTES: &[&str] = &[CLASS_TAG, "id", "created_at", "updated_at"];

pub type RecordResult<T> = Result<T, RecordError>;

/// Record mutation and decode errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Attribute belongs to the identity/lifecycle header.
    ReadOnlyAttribute(String),
    /// `__class__` tag does not name a known kind.
    UnknownClass(String),
    MissingField(&'static str),
    InvalidField { field: String, message: String },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnlyAttribute(name) => write!(f, "attribute `{name}` is read-only"),
            Self::UnknownClass(name) => write!(f, "unknown record class `{name}`"),
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::InvalidField { field, message } => {
                write!(f, "invalid field `{field}`: {message}")
            }
        }
    }
}

impl Error for RecordError {}

/// One persisted domain entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Kind tag plus the kind's declared fields.
    pub body: RecordBody,
    /// Attributes set through `update` that the kind does not declare.
    pub extra: Map<String, Value>,
}

impl Record {
    /// Creates a record of `kind` with a fresh id and default fields.
    ///
    /// # Invariants
    /// - `created_at == updated_at` on return.
    pub fn new(kind: RecordKind) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: RecordBody::new(kind),
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }

    /// Store key: `<ClassName>.<id>`.
    pub fn key(&self) -> String {
        record_key(self.kind(), &self.id.to_string())
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Reads a declared field or extra attribute as text.
    ///
    /// Non-string extra values loaded from disk are rendered as JSON.
    pub fn attribute(&self, name: &str) -> Option<String> {
        if let Some(value) = self.body.get(name) {
            return Some(value.to_string());
        }
        self.extra.get(name).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    /// Sets `name` to `value` verbatim.
    ///
    /// Declared fields are written in place; any other name becomes an
    /// extra attribute. Does not touch `updated_at`.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> RecordResult<()> {
        if READ_ONLY_ATTRIBUTES.contains(&name) {
            return Err(RecordError::ReadOnlyAttribute(name.to_string()));
        }
        let value = value.into();
        match self.body.field_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.extra.insert(name.to_string(), Value::String(value));
            }
        }
        Ok(())
    }

    /// Flat JSON object: class tag, header, declared fields, extras.
    pub fn to_json_object(&self) -> Map<String, Value> {
        let mut object = Map::new();
        object.insert(
            CLASS_TAG.to_string(),
            Value::String(self.kind().name().to_string()),
        );
        self.write_fields(&mut object);
        object
    }

    /// Rebuilds a record from its flat JSON object.
    ///
    /// # Errors
    /// - `MissingField` when `__class__`, `id` or a timestamp is absent.
    /// - `UnknownClass` when the tag is not a known kind.
    /// - `InvalidField` for malformed ids, timestamps or non-string
    ///   declared fields.
    pub fn from_json_object(object: &Map<String, Value>) -> RecordResult<Self> {
        let class_name = required_str(object, CLASS_TAG)?;
        let kind = RecordKind::from_name(class_name)
            .ok_or_else(|| RecordError::UnknownClass(class_name.to_string()))?;

        let id_text = required_str(object, "id")?;
        let id = Uuid::parse_str(id_text).map_err(|err| RecordError::InvalidField {
            field: "id".to_string(),
            message: err.to_string(),
        })?;

        let mut record = Self {
            id,
            created_at: parse_timestamp("created_at", required_str(object, "created_at")?)?,
            updated_at: parse_timestamp("updated_at", required_str(object, "updated_at")?)?,
            body: RecordBody::new(kind),
            extra: Map::new(),
        };

        for (name, value) in object {
            if READ_ONLY_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            match record.body.field_mut(name) {
                Some(slot) => {
                    let text = value.as_str().ok_or_else(|| RecordError::InvalidField {
                        field: name.clone(),
                        message: format!("expected string, got {value}"),
                    })?;
                    *slot = text.to_string();
                }
                None => {
                    record.extra.insert(name.clone(), value.clone());
                }
            }
        }

        Ok(record)
    }

    fn write_fields(&self, object: &mut Map<String, Value>) {
        object.insert("id".to_string(), Value::String(self.id.to_string()));
        object.insert(
            "created_at".to_string(),
            Value::String(format_timestamp(&self.created_at)),
        );
        object.insert(
            "updated_at".to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        for name in self.body.field_names() {
            if let Some(value) = self.body.get(name) {
                object.insert((*name).to_string(), Value::String(value.to_string()));
            }
        }
        for (name, value) in &self.extra {
            object.insert(name.clone(), value.clone());
        }
    }
}

impl Display for Record {
    /// `[<ClassName>] (<id>) {<fields>}`; the class tag is omitted from the map.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut fields = Map::new();
        self.write_fields(&mut fields);
        write!(
            f,
            "[{}] ({}) {}",
            self.kind().name(),
            self.id,
            Value::Object(fields)
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_object().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_json_object(&object).map_err(D::Error::custom)
    }
}

/// Builds the store key for a class name and raw id text.
pub fn record_key(kind: RecordKind, id: &str) -> String {
    format!("{}.{}", kind.name(), id)
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(field: &str, text: &str) -> RecordResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|err| RecordError::InvalidField {
            field: field.to_string(),
            message: format!("`{text}`: {err}"),
        })
}

fn required_str<'a>(object: &'a Map<String, Value>, field: &'static str) -> RecordResult<&'a str> {
    match object.get(field) {
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(other) => Err(RecordError::InvalidField {
            field: field.to_string(),
            message: format!("expected string, got {other}"),
        }),
        None => Err(RecordError::MissingField(field)),
    }
}
