use crate::core::schema::ColumnSchema;
use derive_deref::Deref;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use strum::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[strum(serialize = "asc")]
    Asc,
    #[strum(serialize = "desc")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortColumn {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort keys in priority order; empty means source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deref, Serialize, Deserialize)]
pub struct SortState(Vec<SortColumn>);

impl SortState {
    pub fn new(keys: Vec<SortColumn>) -> Self {
        Self(keys)
    }

    pub fn direction_of(&self, column_id: &str) -> Option<SortDirection> {
        self.0
            .iter()
            .find(|key| key.column_id == column_id)
            .map(|key| key.direction)
    }

    /// Zero-based priority of a column among the sort keys
    pub fn rank_of(&self, column_id: &str) -> Option<usize> {
        self.0.iter().position(|key| key.column_id == column_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    pub global: String,
    /// Only non-empty values are stored
    pub per_column: BTreeMap<String, String>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.global.is_empty() || !self.per_column.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityState {
    hidden: BTreeSet<String>,
}

impl VisibilityState {
    pub fn is_hidden(&self, column_id: &str) -> bool {
        self.hidden.contains(column_id)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

/// Complete user-controlled table state
///
/// Equality and hashing cover every field so the snapshot can key a
/// derivation cache directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableState {
    pub filters: FilterState,
    pub visibility: VisibilityState,
    pub sort: SortState,
}

/// Owner of the filter, sort and visibility state for one table
///
/// Every mutator validates the column id against the schema and its
/// capability flags. Requests for unknown or ineligible columns are ignored
/// and leave the state untouched. Mutators return whether anything changed.
#[derive(Debug, Clone)]
pub struct TableStore {
    schema: Arc<ColumnSchema>,
    state: TableState,
}

impl TableStore {
    pub fn new(schema: Arc<ColumnSchema>) -> Self {
        Self {
            schema,
            state: TableState::default(),
        }
    }

    pub fn schema(&self) -> &Arc<ColumnSchema> {
        &self.schema
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> TableState {
        self.state.clone()
    }

    /// Back to empty filters, source order and every column visible
    pub fn reset(&mut self) -> bool {
        let changed = self.state != TableState::default();
        self.state = TableState::default();
        changed
    }

    // ---- Global filter ----

    pub fn global_filter(&self) -> &str {
        &self.state.filters.global
    }

    pub fn set_global_filter(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.state.filters.global == value {
            return false;
        }
        self.state.filters.global = value;
        true
    }

    // ---- Per-column filters ----

    pub fn column_filter(&self, column_id: &str) -> &str {
        self.state
            .filters
            .per_column
            .get(column_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn active_column_filters(&self) -> &BTreeMap<String, String> {
        &self.state.filters.per_column
    }

    /// Set a column filter; an empty value removes it
    pub fn set_column_filter(&mut self, column_id: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.schema.get(column_id) {
            Some(column) if column.can_filter() => {}
            _ => {
                debug!(column_id, "Ignoring filter for unknown or unfilterable column");
                return false;
            }
        }

        let filters = &mut self.state.filters.per_column;
        if value.is_empty() {
            return filters.remove(column_id).is_some();
        }
        if filters.get(column_id) == Some(&value) {
            return false;
        }
        filters.insert(column_id.to_string(), value);
        true
    }

    pub fn clear_column_filter(&mut self, column_id: &str) -> bool {
        self.state.filters.per_column.remove(column_id).is_some()
    }

    pub fn clear_column_filters(&mut self) -> bool {
        let changed = !self.state.filters.per_column.is_empty();
        self.state.filters.per_column.clear();
        changed
    }

    // ---- Visibility ----

    pub fn is_hidden(&self, column_id: &str) -> bool {
        self.state.visibility.is_hidden(column_id)
    }

    pub fn hidden_count(&self) -> usize {
        self.state.visibility.hidden_count()
    }

    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) -> bool {
        match self.schema.get(column_id) {
            Some(column) if column.can_hide() => {}
            _ => {
                debug!(column_id, "Ignoring visibility change for non-hideable column");
                return false;
            }
        }

        let hidden = &mut self.state.visibility.hidden;
        if visible {
            hidden.remove(column_id)
        } else {
            hidden.insert(column_id.to_string())
        }
    }

    pub fn toggle_column_visibility(&mut self, column_id: &str) -> bool {
        let visible = self.is_hidden(column_id);
        self.set_column_visibility(column_id, visible)
    }

    /// Show every hideable column
    pub fn show_all_columns(&mut self) -> bool {
        let changed = !self.state.visibility.hidden.is_empty();
        self.state.visibility.hidden.clear();
        changed
    }

    /// Hide every hideable column; non-hideable columns stay visible
    pub fn hide_all_columns(&mut self) -> bool {
        let before = self.state.visibility.hidden.len();
        let hideable: Vec<String> = self
            .schema
            .iter()
            .filter(|column| column.can_hide())
            .map(|column| column.id().to_string())
            .collect();
        self.state.visibility.hidden.extend(hideable);
        self.state.visibility.hidden.len() != before
    }

    // ---- Sorting ----

    pub fn sort_state(&self) -> &SortState {
        &self.state.sort
    }

    /// Replace the sort keys, dropping unsortable or repeated columns
    pub fn set_sort(&mut self, keys: Vec<SortColumn>) -> bool {
        let mut accepted: Vec<SortColumn> = Vec::with_capacity(keys.len());
        for key in keys {
            let sortable = self
                .schema
                .get(&key.column_id)
                .is_some_and(|column| column.can_sort());
            if !sortable {
                debug!(column_id = %key.column_id, "Ignoring sort on unsortable column");
                continue;
            }
            if accepted.iter().any(|k| k.column_id == key.column_id) {
                continue;
            }
            accepted.push(key);
        }

        let next = SortState(accepted);
        if self.state.sort == next {
            return false;
        }
        self.state.sort = next;
        true
    }

    /// Advance one column through none, ascending, descending, none
    ///
    /// The column becomes the only sort key.
    pub fn cycle_sort(&mut self, column_id: &str) -> bool {
        let next = match self.state.sort.direction_of(column_id) {
            None => vec![SortColumn::asc(column_id)],
            Some(SortDirection::Asc) => vec![SortColumn::desc(column_id)],
            Some(SortDirection::Desc) => Vec::new(),
        };
        let sortable = self
            .schema
            .get(column_id)
            .is_some_and(|column| column.can_sort());
        if !sortable {
            debug!(column_id, "Ignoring sort toggle on unsortable column");
            return false;
        }
        self.set_sort(next)
    }

    pub fn clear_sort(&mut self) -> bool {
        self.set_sort(Vec::new())
    }
}
