//! Per-column filter inputs
//!
//! One text input per column that is both filterable and visible. Filters on
//! columns that get hidden keep applying; they still show up as badges so
//! the user can see why rows are missing.

use crate::core::{TableStore, ViewModel};
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tui_textarea::{CursorMove, TextArea};

const LABEL_WIDTH: u16 = 20;

struct FilterInput {
    column_id: String,
    header: String,
    input: TextArea<'static>,
}

impl FilterInput {
    fn new(column_id: &str, header: &str, value: &str) -> Self {
        let mut input = TextArea::new(vec![value.to_string()]);
        input.set_placeholder_text(format!("Filter {header}..."));
        input.set_cursor_line_style(Style::default());
        input.move_cursor(CursorMove::End);
        Self {
            column_id: column_id.to_string(),
            header: header.to_string(),
            input,
        }
    }

    fn value(&self) -> String {
        self.input.lines().first().cloned().unwrap_or_default()
    }
}

pub struct ColumnFilters {
    entries: Vec<FilterInput>,
    /// (header, value) for every active filter, hidden columns included
    active: Vec<(String, String)>,
    selected: usize,
    focused: bool,
    theme: Theme,
}

impl Default for ColumnFilters {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            active: Vec::new(),
            selected: 0,
            focused: false,
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Rebuild the inputs from the current view and the store's filter values
    pub fn sync(&mut self, view: &ViewModel, store: &TableStore) {
        let mut previous = std::mem::take(&mut self.entries);
        self.entries = view
            .columns
            .iter()
            .filter(|column| column.filterable)
            .map(|column| {
                let value = store.column_filter(&column.id);
                match previous.iter().position(|e| e.column_id == column.id) {
                    Some(idx) if previous[idx].value() == value => previous.swap_remove(idx),
                    _ => FilterInput::new(&column.id, &column.header, value),
                }
            })
            .collect();
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));

        self.active = store
            .active_column_filters()
            .iter()
            .map(|(id, value)| {
                let header = store
                    .schema()
                    .get(id)
                    .map(|c| c.header_label())
                    .unwrap_or_else(|| id.clone());
                (header, value.clone())
            })
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column ids with an input, in display order
    pub fn columns(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.column_id.as_str()).collect()
    }

    pub fn selected_column(&self) -> Option<&str> {
        self.entries.get(self.selected).map(|e| e.column_id.as_str())
    }

    pub fn active_badges(&self) -> &[(String, String)] {
        &self.active
    }

    /// Rows needed to show every input plus the badge line and borders
    pub fn desired_height(&self) -> u16 {
        self.entries.len().max(1) as u16 + 3
    }

    /// Feed a raw key to the selected input; returns the new filter when
    /// the text changed
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<(String, String)> {
        if key.code == KeyCode::Enter {
            return None;
        }
        let entry = self.entries.get_mut(self.selected)?;
        entry
            .input
            .input(key)
            .then(|| (entry.column_id.clone(), entry.value()))
    }

    /// Empty the selected input, returning its column id
    pub fn clear_selected(&mut self) -> Option<String> {
        let entry = self.entries.get_mut(self.selected)?;
        *entry = FilterInput::new(&entry.column_id, &entry.header, "");
        Some(entry.column_id.clone())
    }

    pub fn clear_all(&mut self) {
        for entry in &mut self.entries {
            *entry = FilterInput::new(&entry.column_id, &entry.header, "");
        }
        self.active.clear();
    }

    fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    fn select_prev(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + self.entries.len() - 1) % self.entries.len();
        }
    }

    fn badge_line(&self) -> Line<'static> {
        if self.active.is_empty() {
            return Line::styled("No active column filters", self.theme.muted_style());
        }
        let mut spans = Vec::with_capacity(self.active.len() * 2);
        for (header, value) in &self.active {
            spans.push(Span::styled(
                format!(" {header}: {value} "),
                self.theme.badge_style(),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

impl Component for ColumnFilters {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveDown => self.select_next(),
            Action::MoveUp => self.select_prev(),
            Action::ClearInput => {
                self.clear_selected();
            }
            Action::ClearColumnFilters => self.clear_all(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Column filters ")
            .border_style(self.theme.border_for(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(1); self.entries.len().max(1)];
        constraints.push(Constraint::Length(1));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        if self.entries.is_empty() {
            frame.render_widget(
                Paragraph::new("No filterable columns are currently visible.")
                    .style(self.theme.muted_style()),
                rows[0],
            );
        }

        for (idx, entry) in self.entries.iter_mut().enumerate() {
            let Some(row) = rows.get(idx) else { break };
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)])
                .split(*row);

            let selected = idx == self.selected;
            let label_style = if selected && self.focused {
                self.theme.header_selected_style()
            } else {
                self.theme.header_style()
            };
            frame.render_widget(
                Paragraph::new(format!("{}:", entry.header)).style(label_style),
                cells[0],
            );

            let cursor = if selected && self.focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            entry.input.set_cursor_style(cursor);
            frame.render_widget(&entry.input, cells[1]);
        }

        if let Some(last) = rows.last() {
            frame.render_widget(Paragraph::new(self.badge_line()), *last);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &[
            Action::MoveUp,
            Action::MoveDown,
            Action::ClearInput,
            Action::ClearColumnFilters,
        ]
    }

    fn name(&self) -> &str {
        "ColumnFilters"
    }
}

impl Focusable for ColumnFilters {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnDescriptor, ColumnSchema, Dataset, derive};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn store() -> TableStore {
        let schema = ColumnSchema::new(vec![
            ColumnDescriptor::key("fullName", "Name"),
            ColumnDescriptor::key("email", "Email"),
            ColumnDescriptor::key("amount", "Amount").filterable(false),
        ])
        .unwrap();
        TableStore::new(Arc::new(schema))
    }

    fn synced(store: &TableStore) -> ColumnFilters {
        let view = derive(store.schema(), &Dataset::empty("_id"), store.state());
        let mut filters = ColumnFilters::new();
        filters.sync(&view, store);
        filters
    }

    #[test]
    fn test_only_filterable_visible_columns_get_inputs() {
        let mut store = store();
        assert_eq!(synced(&store).columns(), vec!["fullName", "email"]);

        store.set_column_visibility("email", false);
        assert_eq!(synced(&store).columns(), vec!["fullName"]);

        store.hide_all_columns();
        assert!(synced(&store).is_empty());
    }

    #[test]
    fn test_hidden_filter_still_listed_as_badge() {
        let mut store = store();
        store.set_column_filter("email", "gmail");
        store.set_column_visibility("email", false);
        let filters = synced(&store);
        assert_eq!(
            filters.active_badges(),
            &[("Email".to_string(), "gmail".to_string())]
        );
    }

    #[test]
    fn test_typing_reports_change() {
        let store = store();
        let mut filters = synced(&store);
        filters.handle_action(Action::MoveDown).unwrap();
        let change = filters.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE));
        assert_eq!(change, Some(("email".to_string(), "g".to_string())));
    }

    #[test]
    fn test_clear_selected_and_all() {
        let mut store = store();
        store.set_column_filter("fullName", "asha");
        store.set_column_filter("email", "gmail");
        let mut filters = synced(&store);

        assert_eq!(filters.clear_selected().as_deref(), Some("fullName"));
        filters.clear_all();
        assert!(filters.active_badges().is_empty());
    }

    #[test]
    fn test_selection_wraps() {
        let store = store();
        let mut filters = synced(&store);
        filters.handle_action(Action::MoveUp).unwrap();
        assert_eq!(filters.selected_column(), Some("email"));
        filters.handle_action(Action::MoveDown).unwrap();
        assert_eq!(filters.selected_column(), Some("fullName"));
    }
}
