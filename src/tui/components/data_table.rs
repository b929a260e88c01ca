use crate::core::{
    ColumnSchema, DerivationCache, Dataset, Row, RowAction, TableStore, ViewModel, VisibleColumn,
};
use crate::core::SortDirection;
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const MIN_COL_WIDTH: u16 = 4;
const MAX_COL_WIDTH: u16 = 40;

/// Cursor position within the derived view (row, visible column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Window of the view currently on screen
#[derive(Debug, Clone)]
pub struct Viewport {
    pub top: usize,    // First visible row
    pub left: usize,   // First visible column
    pub height: usize, // Rows that fit
}

/// The donation table: owns the dataset, its state store and the cursor
///
/// Every render derives the view through a cache, so unchanged state and
/// data reuse the previous derivation.
pub struct DataTable {
    title: String,
    schema: Arc<ColumnSchema>,
    dataset: Dataset,
    store: TableStore,
    cache: DerivationCache,
    cursor: Position,
    viewport: Viewport,
    focused: bool,
    theme: Theme,
    clear_search_hint: Option<String>,
    supported_actions: Vec<Action>,
}

impl DataTable {
    pub fn new(title: impl Into<String>, schema: Arc<ColumnSchema>, dataset: Dataset) -> Self {
        Self {
            title: title.into(),
            store: TableStore::new(Arc::clone(&schema)),
            schema,
            dataset,
            cache: DerivationCache::new(),
            cursor: Position::default(),
            viewport: Viewport {
                top: 0,
                left: 0,
                height: 20, // Updated on render
            },
            focused: false,
            theme: Theme::default(),
            clear_search_hint: None,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::MoveLeft,
                Action::MoveRight,
                Action::PageUp,
                Action::PageDown,
                Action::Home,
                Action::End,
                Action::GoToTop,
                Action::GoToBottom,
                Action::CycleSort,
                Action::ClearSort,
                Action::HideColumn,
            ],
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Key hint shown in the empty state, e.g. "x"
    pub fn set_clear_search_hint(&mut self, hint: Option<String>) {
        self.clear_search_hint = hint;
    }

    pub fn schema(&self) -> &Arc<ColumnSchema> {
        &self.schema
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Mutable access to filter, sort and visibility state
    pub fn store_mut(&mut self) -> &mut TableStore {
        &mut self.store
    }

    /// Current derived view
    pub fn view(&mut self) -> Arc<ViewModel> {
        self.cache
            .get_or_derive(&self.schema, &self.dataset, self.store.state())
    }

    /// Swap in freshly fetched data, keeping filters, sort and visibility
    pub fn set_dataset(&mut self, dataset: Dataset) {
        debug!(rows = dataset.len(), "Replacing table dataset");
        self.dataset = dataset;
        self.clamp_cursor();
    }

    pub fn remove_row(&mut self, id: &str) -> bool {
        let removed = self.dataset.remove_row(id).is_some();
        self.clamp_cursor();
        removed
    }

    pub fn update_field(&mut self, id: &str, path: &str, value: Value) -> bool {
        self.dataset.update_field(id, path, value)
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Record under the cursor
    pub fn current_row(&mut self) -> Option<Arc<Row>> {
        let view = self.view();
        view.rows
            .get(self.cursor.row)
            .map(|derived| Arc::clone(&derived.row))
    }

    /// Visible column under the cursor
    pub fn current_column(&mut self) -> Option<VisibleColumn> {
        let view = self.view();
        view.columns.get(self.cursor.col).cloned()
    }

    /// Row actions available at the cursor, when it sits on an action column
    pub fn current_row_actions(&mut self) -> Option<(Arc<Row>, Vec<RowAction>)> {
        let column = self.current_column()?;
        if !column.is_action {
            return None;
        }
        let row = self.current_row()?;
        let actions = self.schema.get(&column.id)?.row_actions().to_vec();
        Some((row, actions))
    }

    /// Keep the cursor inside the current view
    pub fn clamp_cursor(&mut self) {
        let view = self.view();
        self.cursor.row = self.cursor.row.min(view.displayed_rows().saturating_sub(1));
        self.cursor.col = self.cursor.col.min(view.visible_columns().saturating_sub(1));
        self.ensure_cursor_visible();
    }

    fn cycle_sort_current(&mut self) -> bool {
        match self.current_column() {
            Some(column) => self.store.cycle_sort(&column.id),
            None => false,
        }
    }

    fn hide_current_column(&mut self) -> bool {
        let Some(column) = self.current_column() else {
            return false;
        };
        let changed = self.store.set_column_visibility(&column.id, false);
        self.clamp_cursor();
        changed
    }

    fn row_count(&mut self) -> usize {
        self.view().displayed_rows()
    }

    fn column_count(&mut self) -> usize {
        self.view().visible_columns()
    }

    fn ensure_cursor_visible(&mut self) {
        let height = self.viewport.height.max(1);
        if self.cursor.row < self.viewport.top {
            self.viewport.top = self.cursor.row;
        } else if self.cursor.row >= self.viewport.top + height {
            self.viewport.top = self.cursor.row + 1 - height;
        }
        if self.cursor.col < self.viewport.left {
            self.viewport.left = self.cursor.col;
        }
    }

    fn move_rows(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let target = self.cursor.row.saturating_add_signed(delta);
        self.cursor.row = target.min(count - 1);
        self.ensure_cursor_visible();
    }

    fn move_cols(&mut self, delta: isize) {
        let count = self.column_count();
        if count == 0 {
            return;
        }
        let target = self.cursor.col.saturating_add_signed(delta);
        self.cursor.col = target.min(count - 1);
        self.ensure_cursor_visible();
    }

    fn header_text(column: &VisibleColumn) -> String {
        let mut text = String::new();
        if let Some(direction) = column.sort {
            text.push(match direction {
                SortDirection::Asc => '↑',
                SortDirection::Desc => '↓',
            });
            if let Some(rank) = column.sort_rank {
                text.push_str(&(rank + 1).to_string());
            }
            text.push(' ');
        }
        text.push_str(&column.header);
        if column.filtered {
            text.push_str(" *");
        }
        text
    }

    /// Width per visible column from the header and the rows on screen
    fn column_widths(&self, view: &ViewModel) -> Vec<u16> {
        let end = (self.viewport.top + self.viewport.height).min(view.rows.len());
        let on_screen = view.rows.get(self.viewport.top..end).unwrap_or(&[]);
        view.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let header = Self::header_text(column).chars().count();
                let widest = on_screen
                    .iter()
                    .map(|row| row.cells[i].text.chars().count())
                    .max()
                    .unwrap_or(0);
                (header.max(widest) as u16).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
            })
            .collect()
    }

    /// Scroll horizontally until the cursor column fits, returning the
    /// range of columns drawn
    fn fit_columns(&mut self, widths: &[u16], available: u16) -> std::ops::Range<usize> {
        let fits_from = |left: usize, target: usize| {
            let used: u16 = widths[left..=target].iter().map(|w| w + 1).sum();
            used <= available.max(1) || left == target
        };
        if !widths.is_empty() {
            while self.viewport.left < self.cursor.col && !fits_from(self.viewport.left, self.cursor.col)
            {
                self.viewport.left += 1;
            }
        }

        let mut end = self.viewport.left;
        let mut used = 0u16;
        while end < widths.len() && (used + widths[end] + 1 <= available || end == self.viewport.left) {
            used += widths[end] + 1;
            end += 1;
        }
        self.viewport.left..end
    }

    fn title_line(&self, view: &ViewModel) -> Line<'static> {
        let position = if view.is_empty() {
            0
        } else {
            self.cursor.row + 1
        };
        let mut spans = vec![Span::raw(format!(
            " {} [{}/{}] ",
            self.title,
            position,
            view.displayed_rows()
        ))];
        let hidden = self.store.hidden_count();
        if hidden > 0 {
            spans.push(Span::styled(
                format!(" {hidden} hidden "),
                self.theme.badge_style(),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::styled("No results found", self.theme.warning_style()),
        ];
        if !self.store.global_filter().is_empty() {
            let key = self.clear_search_hint.as_deref().unwrap_or("x");
            lines.push(Line::styled(
                format!("Press {key} to clear search"),
                self.theme.muted_style(),
            ));
        }
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, view: &ViewModel) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        frame.render_widget(
            Paragraph::new(view.status_line()).style(self.theme.muted_style()),
            halves[0],
        );
        frame.render_widget(
            Paragraph::new(view.columns_line())
                .style(self.theme.muted_style())
                .alignment(Alignment::Right),
            halves[1],
        );
    }
}

impl Component for DataTable {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        let page = self.viewport.height.max(1) as isize;
        match action {
            Action::MoveUp => self.move_rows(-1),
            Action::MoveDown => self.move_rows(1),
            Action::MoveLeft => self.move_cols(-1),
            Action::MoveRight => self.move_cols(1),
            Action::PageUp => self.move_rows(-page),
            Action::PageDown => self.move_rows(page),
            Action::GoToTop => self.move_rows(isize::MIN),
            Action::GoToBottom => self.move_rows(isize::MAX),
            Action::Home => self.move_cols(isize::MIN),
            Action::End => self.move_cols(isize::MAX),
            Action::CycleSort => {
                self.cycle_sort_current();
                self.clamp_cursor();
            }
            Action::ClearSort => {
                self.store.clear_sort();
            }
            Action::HideColumn => {
                self.hide_current_column();
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_for(self.focused));
        let inner = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        let (table_area, footer_area) = (chunks[0], chunks[1]);

        // One line for the header row
        self.viewport.height = table_area.height.saturating_sub(1).max(1) as usize;
        self.clamp_cursor();
        let view = self.view();

        frame.render_widget(block.title(self.title_line(&view)), area);
        self.render_footer(frame, footer_area, &view);

        if view.is_empty() {
            self.render_empty(frame, table_area);
            return;
        }

        let widths = self.column_widths(&view);
        let shown = self.fit_columns(&widths, table_area.width);

        let header_cells: Vec<Cell> = shown
            .clone()
            .map(|i| {
                let column = &view.columns[i];
                let style = if i == self.cursor.col {
                    self.theme.header_selected_style()
                } else {
                    self.theme.header_style()
                };
                Cell::from(Self::header_text(column)).style(style)
            })
            .collect();
        let header = TableRow::new(header_cells).style(self.theme.header_style());

        let end = (self.viewport.top + self.viewport.height).min(view.rows.len());
        let rows: Vec<TableRow> = (self.viewport.top..end)
            .map(|row_idx| {
                let derived = &view.rows[row_idx];
                let selected_row = row_idx == self.cursor.row;
                let row_style = if selected_row {
                    self.theme.selected_style()
                } else if row_idx % 2 == 1 {
                    self.theme.alt_row_style()
                } else {
                    self.theme.normal_style()
                };

                let cells: Vec<Cell> = shown
                    .clone()
                    .map(|col_idx| {
                        let rendered = &derived.cells[col_idx];
                        if selected_row && col_idx == self.cursor.col && self.focused {
                            Cell::from(rendered.text.clone()).style(self.theme.selected_cell_style())
                        } else if selected_row {
                            Cell::from(rendered.text.clone())
                        } else {
                            Cell::from(Span::styled(
                                rendered.text.clone(),
                                self.theme.tone_style(rendered.tone),
                            ))
                        }
                    })
                    .collect();
                TableRow::new(cells).style(row_style)
            })
            .collect();

        let constraints: Vec<Constraint> = shown.map(|i| Constraint::Length(widths[i])).collect();
        let table = Table::new(rows, constraints)
            .header(header)
            .column_spacing(1);
        frame.render_widget(table, table_area);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "DataTable"
    }
}

impl Focusable for DataTable {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
