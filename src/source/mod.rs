use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;

/// One roster entry. Every field is optional; absent values render as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub group: Option<String>,
    pub index: Option<String>,
    pub fio: Option<String>,
}

impl Record {
    pub fn new(group: Option<&str>, index: Option<&str>, fio: Option<&str>) -> Self {
        Self {
            group: group.map(str::to_string),
            index: index.map(str::to_string),
            fio: fio.map(str::to_string),
        }
    }

    pub fn group_or_empty(&self) -> &str {
        self.group.as_deref().unwrap_or_default()
    }

    pub fn index_or_empty(&self) -> &str {
        self.index.as_deref().unwrap_or_default()
    }

    pub fn fio_or_empty(&self) -> &str {
        self.fio.as_deref().unwrap_or_default()
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                group: field_text(fields, "group"),
                index: field_text(fields, "index"),
                fio: field_text(fields, "fio"),
            },
            _ => Self::default(),
        }
    }
}

// Scalars are kept as text; null and nested values count as absent.
fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Records loaded for a single request, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("data source unavailable: {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data source {origin}: {reason}")]
    Malformed { origin: String, reason: String },
}

impl SourceError {
    /// Short text safe to show to clients; carries no path or parser detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            SourceError::Unavailable { .. } => "data source not found",
            SourceError::Malformed { .. } => "malformed data source",
        }
    }
}

/// Where the roster comes from. `Inline` holds the JSON text itself.
#[derive(Clone, Debug)]
pub enum RecordSource {
    FilePath(PathBuf),
    Inline(String),
}

impl RecordSource {
    pub fn describe(&self) -> String {
        match self {
            RecordSource::FilePath(path) => path.display().to_string(),
            RecordSource::Inline(_) => "<inline>".to_string(),
        }
    }

    /// Reads and parses the whole source. Blocking; call it off the async workers.
    pub fn load(&self) -> Result<Dataset, SourceError> {
        match self {
            RecordSource::FilePath(path) => {
                let bytes = std::fs::read(path).map_err(|source| SourceError::Unavailable {
                    path: path.display().to_string(),
                    source,
                })?;
                parse_bytes(&bytes, &self.describe())
            }
            RecordSource::Inline(text) => parse_bytes(text.as_bytes(), &self.describe()),
        }
    }
}

pub fn parse_dataset(text: &str) -> Result<Dataset, SourceError> {
    parse_bytes(text.as_bytes(), "<inline>")
}

fn parse_bytes(bytes: &[u8], origin: &str) -> Result<Dataset, SourceError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| SourceError::Malformed {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SourceError::Malformed {
                origin: origin.to_string(),
                reason: format!("expected a top-level array, found {}", json_kind(&other)),
            })
        }
    };
    Ok(Dataset::new(items.iter().map(Record::from_value).collect()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
