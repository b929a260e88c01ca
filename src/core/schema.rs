use crate::core::row::Row;
use crate::core::value::CellValue;
use derive_deref::Deref;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use strum::Display;
use thiserror::Error;

/// Computes a cell value from the whole row
pub type DeriveFn = Arc<dyn Fn(&Row) -> CellValue + Send + Sync>;

/// Produces a header label from the column id
pub type HeaderFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Turns a resolved value (plus its row, for conditional output) into display text
pub type RenderFn = Arc<dyn Fn(&CellValue, &Row) -> RenderedCell + Send + Sync>;

/// Callback run for a row-level action
pub type RowCallback = Arc<dyn Fn(&Row) + Send + Sync>;

/// How a column obtains its value from a row
#[derive(Clone)]
pub enum Accessor {
    /// Field name or dot path into the record
    Key(String),
    /// Computed from the whole row
    Derived(DeriveFn),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Accessor::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

#[derive(Clone)]
pub enum Header {
    Text(String),
    Render(HeaderFn),
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Header::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// Semantic colour hint attached to rendered cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Plain,
    Success,
    Warning,
    Danger,
    Muted,
    Accent,
}

/// Display form of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedCell {
    pub text: String,
    pub tone: Tone,
}

impl RenderedCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// A labelled per-row operation, such as "Delete"
///
/// The table only invokes the callback; what it does is up to the page
/// that built the column.
#[derive(Clone)]
pub struct RowAction {
    pub label: String,
    callback: RowCallback,
}

impl RowAction {
    pub fn new(label: impl Into<String>, callback: impl Fn(&Row) + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            callback: Arc::new(callback),
        }
    }

    pub fn invoke(&self, row: &Row) {
        (self.callback)(row)
    }
}

impl fmt::Debug for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Declarative description of one table column
#[derive(Clone)]
pub struct ColumnDescriptor {
    id: String,
    accessor: Accessor,
    header: Header,
    renderer: Option<RenderFn>,
    actions: Vec<RowAction>,
    sortable: bool,
    filterable: bool,
    hideable: bool,
}

impl ColumnDescriptor {
    /// Column reading a record field; sortable, filterable and hideable
    pub fn key(key: impl Into<String>, header: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: key.clone(),
            accessor: Accessor::Key(key),
            header: Header::Text(header.into()),
            renderer: None,
            actions: Vec::new(),
            sortable: true,
            filterable: true,
            hideable: true,
        }
    }

    /// Column computed from the row; all capabilities off until enabled
    pub fn derived(
        id: impl Into<String>,
        header: impl Into<String>,
        derive: impl Fn(&Row) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            accessor: Accessor::Derived(Arc::new(derive)),
            header: Header::Text(header.into()),
            renderer: None,
            actions: Vec::new(),
            sortable: false,
            filterable: false,
            hideable: false,
        }
    }

    /// Column holding row-level actions; never sorted, filtered or hidden
    pub fn actions(id: impl Into<String>, header: impl Into<String>, actions: Vec<RowAction>) -> Self {
        Self {
            id: id.into(),
            accessor: Accessor::Derived(Arc::new(|_: &Row| CellValue::Absent)),
            header: Header::Text(header.into()),
            renderer: None,
            actions,
            sortable: false,
            filterable: false,
            hideable: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_header_fn(mut self, header: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.header = Header::Render(Arc::new(header));
        self
    }

    pub fn with_renderer(mut self, renderer: RenderFn) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn can_sort(&self) -> bool {
        self.sortable
    }

    pub fn can_filter(&self) -> bool {
        self.filterable
    }

    pub fn can_hide(&self) -> bool {
        self.hideable
    }

    pub fn row_actions(&self) -> &[RowAction] {
        &self.actions
    }

    pub fn is_action_column(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Value of this column for a row
    pub fn resolve(&self, row: &Row) -> CellValue {
        match &self.accessor {
            Accessor::Key(path) => row.resolve(path),
            Accessor::Derived(derive) => derive(row),
        }
    }

    /// Display form of this column for a row
    ///
    /// Without a renderer the plain string form of the value is shown.
    /// Action columns list their labels.
    pub fn render(&self, row: &Row) -> RenderedCell {
        if self.is_action_column() && self.renderer.is_none() {
            let labels: Vec<String> = self
                .actions
                .iter()
                .map(|action| format!("[{}]", action.label))
                .collect();
            return RenderedCell::toned(labels.join(" "), Tone::Accent);
        }

        let value = self.resolve(row);
        match &self.renderer {
            Some(render) => render(&value, row),
            None => RenderedCell::plain(value.to_display_string()),
        }
    }

    /// Header label; falls back to the id with its first letter capitalised
    pub fn header_label(&self) -> String {
        let label = match &self.header {
            Header::Text(text) => text.clone(),
            Header::Render(render) => render(&self.id),
        };
        if label.is_empty() {
            capitalize(&self.id)
        } else {
            label
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("accessor", &self.accessor)
            .field("header", &self.header)
            .field("actions", &self.actions)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("hideable", &self.hideable)
            .finish_non_exhaustive()
    }
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column id must not be empty")]
    EmptyId,

    #[error("duplicate column id '{0}'")]
    DuplicateId(String),
}

/// Ordered, validated list of column descriptors
#[derive(Debug, Clone, Deref)]
pub struct ColumnSchema(Vec<ColumnDescriptor>);

impl ColumnSchema {
    /// Validate that every column id is non-empty and unique
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.id.is_empty() {
                return Err(SchemaError::EmptyId);
            }
            if !seen.insert(column.id.as_str()) {
                return Err(SchemaError::DuplicateId(column.id.clone()));
            }
        }
        Ok(Self(columns))
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.0.iter().find(|column| column.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|column| column.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|column| column.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn sample_row() -> Row {
        Row::from_value(json!({"_id": "r1", "fullName": "Asha", "amount": 500})).unwrap()
    }

    #[test]
    fn test_key_column_defaults() {
        let col = ColumnDescriptor::key("fullName", "Name");
        assert!(col.can_sort() && col.can_filter() && col.can_hide());
        assert_eq!(col.resolve(&sample_row()), CellValue::from("Asha"));
        assert_eq!(col.render(&sample_row()).text, "Asha");
    }

    #[test]
    fn test_derived_column_defaults_off() {
        let col = ColumnDescriptor::derived("double", "Double", |row| {
            CellValue::from(row.resolve("amount").as_number().unwrap_or(0.0) * 2.0)
        });
        assert!(!col.can_sort() && !col.can_filter() && !col.can_hide());
        assert_eq!(col.render(&sample_row()).text, "1000");
    }

    #[test]
    fn test_header_fallback_capitalizes_id() {
        let col = ColumnDescriptor::key("email", "");
        assert_eq!(col.header_label(), "Email");

        let col = ColumnDescriptor::key("email", "").with_header_fn(|id| id.to_uppercase());
        assert_eq!(col.header_label(), "EMAIL");
    }

    #[test]
    fn test_action_column_invokes_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let col = ColumnDescriptor::actions(
            "actions",
            "Actions",
            vec![RowAction::new("Delete", move |row: &Row| {
                sink.lock().unwrap().push(row.id("_id").unwrap());
            })],
        );

        assert!(col.is_action_column());
        assert_eq!(col.render(&sample_row()).text, "[Delete]");
        col.row_actions()[0].invoke(&sample_row());
        assert_eq!(*seen.lock().unwrap(), vec!["r1".to_string()]);
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let err = ColumnSchema::new(vec![
            ColumnDescriptor::key("email", "Email"),
            ColumnDescriptor::key("email", "Email again"),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateId("email".to_string()));

        let err = ColumnSchema::new(vec![ColumnDescriptor::key("", "Blank")]).unwrap_err();
        assert_eq!(err, SchemaError::EmptyId);
    }

    #[test]
    fn test_with_id_allows_same_key_twice() {
        let schema = ColumnSchema::new(vec![
            ColumnDescriptor::key("amount", "Amount"),
            ColumnDescriptor::key("amount", "Raw amount").with_id("amountRaw"),
        ])
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("amountRaw"), Some(1));
    }
}
