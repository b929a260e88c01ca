use crate::core::value::CellValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

/// Default record identity field used by the donation API
pub const DEFAULT_ROW_ID_FIELD: &str = "_id";

/// A single record: an ordered map of field names to JSON values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value, returning None for anything that is not an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Look up a field by key or by dot-separated path
    ///
    /// A literal key wins over path traversal, so keys that themselves
    /// contain dots stay reachable. Numeric segments index into arrays.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }
        if !path.contains('.') {
            return None;
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolve a path into a cell value
    pub fn resolve(&self, path: &str) -> CellValue {
        self.lookup(path)
            .map(CellValue::from_json)
            .unwrap_or(CellValue::Absent)
    }

    /// Copy of this row with one field replaced
    ///
    /// Dotted paths create intermediate objects as needed.
    pub fn with_field(&self, path: &str, value: Value) -> Row {
        let mut fields = self.0.clone();
        if fields.contains_key(path) || !path.contains('.') {
            fields.insert(path.to_string(), value);
        } else {
            let segments: Vec<&str> = path.split('.').collect();
            set_path(&mut fields, &segments, value);
        }
        Row(fields)
    }

    /// Identity of the row as a string, if the id field is a string or number
    pub fn id(&self, id_field: &str) -> Option<String> {
        match self.lookup(id_field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn set_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

/// Errors raised while turning a fetched payload into a dataset
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("expected an array of records or an object with a `data` array")]
    UnexpectedShape,

    #[error("server reported failure: {0}")]
    Rejected(String),
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Ordered collection of rows with a stable identity field
///
/// Rows are shared behind `Arc` so derived views never copy record data.
/// Every mutation produces a fresh `generation`, which is what derivation
/// caches key on.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Arc<Row>>,
    id_field: String,
    generation: u64,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty(DEFAULT_ROW_ID_FIELD)
    }
}

impl Dataset {
    pub fn empty(id_field: &str) -> Self {
        Self::from_rows(Vec::new(), id_field)
    }

    pub fn from_rows(rows: Vec<Row>, id_field: &str) -> Self {
        Self {
            rows: rows.into_iter().map(Arc::new).collect(),
            id_field: id_field.to_string(),
            generation: next_generation(),
        }
    }

    /// Build a dataset from a fetched JSON payload
    ///
    /// Accepts a bare array of records, or an envelope object carrying the
    /// records under `data`. Envelopes with `success: false` or a
    /// `statusCode` other than 200 are rejected. Array entries that are not
    /// objects are skipped.
    pub fn from_json(payload: Value, id_field: &str) -> Result<Self, PayloadError> {
        let records = match payload {
            Value::Array(items) => items,
            Value::Object(mut envelope) => {
                if envelope.get("success") == Some(&Value::Bool(false)) {
                    let message = envelope
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("request was not successful")
                        .to_string();
                    return Err(PayloadError::Rejected(message));
                }
                if let Some(code) = envelope.get("statusCode").and_then(Value::as_u64) {
                    if code != 200 {
                        return Err(PayloadError::Rejected(format!("status code {code}")));
                    }
                }
                match envelope.remove("data") {
                    Some(Value::Array(items)) => items,
                    _ => return Err(PayloadError::UnexpectedShape),
                }
            }
            _ => return Err(PayloadError::UnexpectedShape),
        };

        let total = records.len();
        let rows: Vec<Row> = records.into_iter().filter_map(Row::from_value).collect();
        if rows.len() < total {
            warn!(
                skipped = total - rows.len(),
                "Ignoring payload entries that are not objects"
            );
        }
        debug!(rows = rows.len(), "Built dataset from payload");
        Ok(Self::from_rows(rows, id_field))
    }

    pub fn rows(&self) -> &[Arc<Row>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Find a row and its position by identity
    pub fn find(&self, id: &str) -> Option<(usize, &Arc<Row>)> {
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.id(&self.id_field).as_deref() == Some(id))
    }

    /// Replace the row with a matching identity; false if no row matched
    pub fn replace_row(&mut self, id: &str, row: Row) -> bool {
        let Some((index, _)) = self.find(id) else {
            return false;
        };
        self.rows[index] = Arc::new(row);
        self.generation = next_generation();
        true
    }

    /// Set one field on the row with a matching identity
    pub fn update_field(&mut self, id: &str, path: &str, value: Value) -> bool {
        let Some((_, row)) = self.find(id) else {
            return false;
        };
        let updated = row.with_field(path, value);
        self.replace_row(id, updated)
    }

    /// Remove the row with a matching identity, returning it
    pub fn remove_row(&mut self, id: &str) -> Option<Arc<Row>> {
        let (index, _) = self.find(id)?;
        let removed = self.rows.remove(index);
        self.generation = next_generation();
        Some(removed)
    }
}
