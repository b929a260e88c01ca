//! Derivation of the displayed view from data, schema and table state
//!
//! Stages run in a fixed order: filter, then sort, then project onto the
//! visible columns. Source data is never modified; the view holds shared
//! handles to the original rows plus their rendered cells.

use crate::core::row::{Dataset, Row};
use crate::core::schema::{ColumnDescriptor, ColumnSchema, RenderedCell};
use crate::core::state::{SortDirection, TableState};
use crate::core::value::CellValue;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::trace;

/// Header-level facts about a column that survived the visibility stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleColumn {
    pub id: String,
    pub header: String,
    pub sort: Option<SortDirection>,
    /// Priority among sort keys, only set when more than one key is active
    pub sort_rank: Option<usize>,
    /// A non-empty per-column filter applies to this column
    pub filtered: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub hideable: bool,
    pub is_action: bool,
}

/// One displayed row
#[derive(Debug, Clone)]
pub struct DerivedRow {
    /// Position of the row in the dataset it came from
    pub source_index: usize,
    pub row: Arc<Row>,
    /// Rendered cells, one per visible column
    pub cells: Vec<RenderedCell>,
}

/// Everything needed to present the table
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub columns: Vec<VisibleColumn>,
    pub rows: Vec<DerivedRow>,
    pub total_rows: usize,
    pub total_columns: usize,
}

impl ViewModel {
    pub fn displayed_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// "Showing X of Y rows"
    pub fn status_line(&self) -> String {
        format!(
            "Showing {} of {} rows",
            self.displayed_rows(),
            self.total_rows
        )
    }

    /// "N of M columns visible"
    pub fn columns_line(&self) -> String {
        format!(
            "{} of {} columns visible",
            self.visible_columns(),
            self.total_columns
        )
    }
}

/// Run the full pipeline
pub fn derive(schema: &ColumnSchema, dataset: &Dataset, state: &TableState) -> ViewModel {
    let matching = filter_rows(schema, dataset, state);
    let ordered = sort_rows(schema, dataset, matching, state);
    let view = project(schema, dataset, ordered, state);
    trace!(
        displayed = view.displayed_rows(),
        total = view.total_rows,
        "Derived table view"
    );
    view
}

/// Indices of rows passing both the global and per-column filters, in source order
pub fn filter_rows(schema: &ColumnSchema, dataset: &Dataset, state: &TableState) -> Vec<usize> {
    let global = state.filters.global.to_lowercase();

    // The global filter searches every filterable column still on screen
    let searchable: Vec<&ColumnDescriptor> = schema
        .iter()
        .filter(|column| column.can_filter() && !state.visibility.is_hidden(column.id()))
        .collect();

    // Column filters keep applying while their column is hidden
    let column_filters: Vec<(&ColumnDescriptor, String)> = state
        .filters
        .per_column
        .iter()
        .filter(|(_, needle)| !needle.is_empty())
        .filter_map(|(id, needle)| {
            schema
                .get(id)
                .filter(|column| column.can_filter())
                .map(|column| (column, needle.to_lowercase()))
        })
        .collect();

    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            column_filters
                .iter()
                .all(|(column, needle)| column.resolve(row).matches(needle))
        })
        .filter(|(_, row)| {
            global.is_empty()
                || searchable
                    .iter()
                    .any(|column| column.resolve(row).matches(&global))
        })
        .map(|(index, _)| index)
        .collect()
}

/// Stable multi-key sort over the filtered indices
///
/// Empty values go last whatever the direction; descending reverses only
/// the comparison of non-empty values, so ties keep source order.
pub fn sort_rows(
    schema: &ColumnSchema,
    dataset: &Dataset,
    indices: Vec<usize>,
    state: &TableState,
) -> Vec<usize> {
    let keys: Vec<(&ColumnDescriptor, SortDirection)> = state
        .sort
        .iter()
        .filter_map(|key| {
            schema
                .get(&key.column_id)
                .filter(|column| column.can_sort())
                .map(|column| (column, key.direction))
        })
        .collect();
    if keys.is_empty() {
        return indices;
    }

    let directions: Vec<SortDirection> = keys.iter().map(|(_, direction)| *direction).collect();
    let mut keyed: Vec<(usize, Vec<CellValue>)> = indices
        .into_iter()
        .map(|index| {
            let row = &dataset.rows()[index];
            let values = keys.iter().map(|(column, _)| column.resolve(row)).collect();
            (index, values)
        })
        .collect();

    // `sort_by` is stable
    keyed.sort_by(|(_, a), (_, b)| compare_keys(a, b, &directions));
    keyed.into_iter().map(|(index, _)| index).collect()
}

fn compare_keys(
    a: &[CellValue],
    b: &[CellValue],
    directions: &[SortDirection],
) -> Ordering {
    for ((left, right), direction) in a.iter().zip(b).zip(directions) {
        let ordering = match (left.is_empty(), right.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = left.compare(right);
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(
    schema: &ColumnSchema,
    dataset: &Dataset,
    ordered: Vec<usize>,
    state: &TableState,
) -> ViewModel {
    let visible: Vec<&ColumnDescriptor> = schema
        .iter()
        .filter(|column| !state.visibility.is_hidden(column.id()))
        .collect();

    let multi_sort = state.sort.len() > 1;
    let columns = visible
        .iter()
        .map(|column| VisibleColumn {
            id: column.id().to_string(),
            header: column.header_label(),
            sort: state.sort.direction_of(column.id()),
            sort_rank: if multi_sort {
                state.sort.rank_of(column.id())
            } else {
                None
            },
            filtered: state.filters.per_column.contains_key(column.id()),
            sortable: column.can_sort(),
            filterable: column.can_filter(),
            hideable: column.can_hide(),
            is_action: column.is_action_column(),
        })
        .collect();

    let rows = ordered
        .into_iter()
        .map(|index| {
            let row = Arc::clone(&dataset.rows()[index]);
            let cells = visible.iter().map(|column| column.render(&row)).collect();
            DerivedRow {
                source_index: index,
                row,
                cells,
            }
        })
        .collect();

    ViewModel {
        columns,
        rows,
        total_rows: dataset.len(),
        total_columns: schema.len(),
    }
}

/// Memoises the last derived view
///
/// The key is the schema identity, the dataset generation and the full
/// state snapshot, so any change to one of them triggers recomputation and
/// repeated renders of an unchanged table reuse the same view.
#[derive(Debug, Default)]
pub struct DerivationCache {
    key: Option<(usize, u64, TableState)>,
    view: Option<Arc<ViewModel>>,
}

impl DerivationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_derive(
        &mut self,
        schema: &Arc<ColumnSchema>,
        dataset: &Dataset,
        state: &TableState,
    ) -> Arc<ViewModel> {
        let schema_id = Arc::as_ptr(schema) as usize;
        if let (Some((cached_schema, cached_generation, cached_state)), Some(view)) =
            (&self.key, &self.view)
        {
            if *cached_schema == schema_id
                && *cached_generation == dataset.generation()
                && cached_state == state
            {
                return Arc::clone(view);
            }
        }

        let view = Arc::new(derive(schema, dataset, state));
        self.key = Some((schema_id, dataset.generation(), state.clone()));
        self.view = Some(Arc::clone(&view));
        view
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.view = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::ColumnDescriptor;
    use crate::core::state::{SortColumn, TableStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dataset() -> Dataset {
        let rows = json!([
            {"_id": "1", "name": "Asha", "amount": 500, "city": "Pune"},
            {"_id": "2", "name": "bilal", "amount": null, "city": "Delhi"},
            {"_id": "3", "name": "Chitra", "amount": 1200, "city": "pune"},
            {"_id": "4", "name": "Dev", "city": "Mumbai"},
            {"_id": "5", "name": "Esha", "amount": 500, "city": "Goa"}
        ]);
        Dataset::from_json(rows, "_id").unwrap()
    }

    fn schema() -> Arc<ColumnSchema> {
        Arc::new(
            ColumnSchema::new(vec![
                ColumnDescriptor::key("name", "Name"),
                ColumnDescriptor::key("amount", "Amount"),
                ColumnDescriptor::key("city", "City"),
            ])
            .unwrap(),
        )
    }

    fn ids(view: &ViewModel) -> Vec<String> {
        view.rows
            .iter()
            .map(|r| r.row.id("_id").unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_empty_values_sort_last_in_both_directions() {
        let schema = schema();
        let data = dataset();
        let mut store = TableStore::new(schema.clone());

        store.cycle_sort("amount");
        let asc = derive(&schema, &data, store.state());
        assert_eq!(ids(&asc), vec!["1", "5", "3", "2", "4"]);

        store.cycle_sort("amount");
        let desc = derive(&schema, &data, store.state());
        assert_eq!(ids(&desc), vec!["3", "1", "5", "2", "4"]);
    }

    #[test]
    fn test_multi_key_sort_with_ranks() {
        let schema = schema();
        let data = dataset();
        let mut store = TableStore::new(schema.clone());
        store.set_sort(vec![SortColumn::asc("amount"), SortColumn::desc("name")]);

        let view = derive(&schema, &data, store.state());
        assert_eq!(ids(&view), vec!["5", "1", "3", "2", "4"]);
        assert_eq!(view.columns[1].sort_rank, Some(0));
        assert_eq!(view.columns[0].sort_rank, Some(1));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let schema = schema();
        let data = dataset();
        let mut store = TableStore::new(schema.clone());
        store.set_global_filter("PUNE");
        let view = derive(&schema, &data, store.state());
        assert_eq!(ids(&view), vec!["1", "3"]);

        store.set_column_filter("name", "chi");
        let view = derive(&schema, &data, store.state());
        assert_eq!(ids(&view), vec!["3"]);
        assert!(view.columns[0].filtered);
    }

    #[test]
    fn test_hidden_column_drops_out_of_global_search_but_keeps_its_filter() {
        let schema = schema();
        let data = dataset();
        let mut store = TableStore::new(schema.clone());

        store.set_column_filter("city", "pune");
        store.set_column_visibility("city", false);
        let view = derive(&schema, &data, store.state());
        assert_eq!(ids(&view), vec!["1", "3"]);
        assert_eq!(view.visible_columns(), 2);
        assert_eq!(view.rows[0].cells.len(), 2);

        store.clear_column_filters();
        store.set_global_filter("goa");
        let view = derive(&schema, &data, store.state());
        assert!(view.is_empty());
    }

    #[test]
    fn test_status_lines() {
        let schema = schema();
        let data = dataset();
        let mut store = TableStore::new(schema.clone());
        store.set_global_filter("esha");
        store.set_column_visibility("city", false);
        let view = derive(&schema, &data, store.state());
        assert_eq!(view.status_line(), "Showing 1 of 5 rows");
        assert_eq!(view.columns_line(), "2 of 3 columns visible");
    }

    #[test]
    fn test_cache_reuses_view_until_inputs_change() {
        let schema = schema();
        let mut data = dataset();
        let mut store = TableStore::new(schema.clone());
        let mut cache = DerivationCache::new();

        let first = cache.get_or_derive(&schema, &data, store.state());
        let second = cache.get_or_derive(&schema, &data, store.state());
        assert!(Arc::ptr_eq(&first, &second));

        store.set_global_filter("a");
        let third = cache.get_or_derive(&schema, &data, store.state());
        assert!(!Arc::ptr_eq(&second, &third));

        data.remove_row("1");
        let fourth = cache.get_or_derive(&schema, &data, store.state());
        assert!(!Arc::ptr_eq(&third, &fourth));
        assert_eq!(fourth.total_rows, 4);
    }
}
