//! Records - the rows owned by the backend framework.
//!
//! A `Record` is a loosely typed bag of fields keyed by name, living in a
//! named collection ("users", "trails", "categories", ...). Accessors follow
//! the framework's casting rules: a missing or mistyped field reads as the
//! zero value of the requested type instead of failing.
//!
//! ## Example
//!
//! ```ignore
//! use trail_search::{InMemoryRecordStore, Record, RecordStore};
//!
//! let store = InMemoryRecordStore::new();
//! let mut trail = Record::new("trails");
//! trail.set("name", "Ridge loop");
//! trail.set("distance", 12.5);
//! store.save_record(&mut trail)?;
//!
//! assert_eq!(trail.get_float("distance"), 12.5);
//! assert_eq!(trail.get_string("missing"), "");
//! ```

mod fs;
mod in_memory;
mod store;

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use fs::FsRecordStore;
pub use in_memory::InMemoryRecordStore;
pub use store::RecordStore;

/// Layout the framework uses when it renders timestamps as strings.
pub const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

/// Length of generated record ids.
const ID_LENGTH: usize = 15;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record not found: {collection}:{id}")]
    NotFound { collection: String, id: String },
    #[error("record already exists: {collection}:{id}")]
    AlreadyExists { collection: String, id: String },
    #[error("invalid identifier {0:?}")]
    InvalidId(String),
    #[error("record serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("record storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// A file waiting to be stored alongside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RecordFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Load a file from disk, keeping its file name.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }
}

/// A single row of a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    id: String,
    collection: String,
    #[serde(default)]
    fields: Map<String, Value>,
    /// Files attached since the last save, keyed by field name.
    #[serde(skip)]
    pending_files: Vec<(String, RecordFile)>,
}

impl Record {
    /// Create an empty, unsaved record in `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    /// Create a record with a caller-chosen id.
    pub fn with_id(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// True until the record has been given an id by a store.
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn unset(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn get_string(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    pub fn get_float(&self, field: &str) -> f64 {
        match self.fields.get(field) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        }
    }

    pub fn get_bool(&self, field: &str) -> bool {
        match self.fields.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        }
    }

    /// Read a multi-value field as unique, non-empty strings in stored order.
    ///
    /// A plain string is treated as a one-element list, or parsed when it
    /// holds a serialized JSON array.
    pub fn get_string_slice(&self, field: &str) -> Vec<String> {
        let items: Vec<Value> = match self.fields.get(field) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(s)) if s.trim_start().starts_with('[') => {
                serde_json::from_str(s).unwrap_or_default()
            }
            Some(Value::String(s)) => vec![Value::String(s.clone())],
            _ => Vec::new(),
        };

        let mut out: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            let s = match item {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !s.is_empty() && !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }

    /// Read a timestamp field. Accepts RFC 3339 and the framework's own layout.
    pub fn get_datetime(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(field) {
            Some(Value::String(s)) => parse_datetime(s),
            _ => None,
        }
    }

    /// Attach a file to `field`. The field takes the file's name right away;
    /// the bytes are written by the store on the next save.
    pub fn add_file(&mut self, field: impl Into<String>, file: RecordFile) {
        let field = field.into();
        self.fields
            .insert(field.clone(), Value::String(file.name.clone()));
        self.pending_files.push((field, file));
    }

    pub fn pending_files(&self) -> &[(String, RecordFile)] {
        &self.pending_files
    }

    pub(crate) fn take_pending_files(&mut self) -> Vec<(String, RecordFile)> {
        std::mem::take(&mut self.pending_files)
    }

    /// Assign an id and bump timestamps ahead of a write.
    pub(crate) fn prepare_for_save(&mut self, now: DateTime<Utc>) -> Result<(), RecordError> {
        validate_identifier(&self.collection)?;
        if self.id.is_empty() {
            self.id = new_record_id();
        }
        validate_identifier(&self.id)?;

        let stamp = Value::String(format_datetime(&now));
        if self.get_datetime("created").is_none() {
            self.fields.insert("created".to_string(), stamp.clone());
        }
        self.fields.insert("updated".to_string(), stamp);
        Ok(())
    }
}

/// Render a timestamp the way the framework stores it.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_LAYOUT).to_string()
}

pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, DATETIME_LAYOUT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Generate a lowercase alphanumeric record id.
pub fn new_record_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(ID_LENGTH);
    id
}

/// Ids and collection names double as path segments, so only
/// `[A-Za-z0-9_-]` is accepted.
pub(crate) fn validate_identifier(value: &str) -> Result<(), RecordError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RecordError::InvalidId(value.to_string()))
    }
}

pub(crate) fn storage_key(collection: &str, id: &str) -> String {
    format!("{}:{}", collection, id)
}
