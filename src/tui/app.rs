use crate::core::Dataset;
use crate::pages::{Page, PageContext, RowCommand};
use crate::services::DonationBackend;
use crate::tui::components::{
    ActionMenu, ColumnFilters, ConfirmDialog, DataTable, SearchBar, VisibilityMenu,
};
use crate::tui::{Action, Component, Focusable, KeyBindings, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

/// Which input receives keys when no overlay is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Search,
    ColumnFilters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Startup settings for the app
pub struct AppOptions {
    pub page: Page,
    pub id_field: String,
    pub base_url: String,
    pub theme: Theme,
    pub keybindings: KeyBindings,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            page: Page::default(),
            id_field: crate::core::DEFAULT_ROW_ID_FIELD.to_string(),
            base_url: String::new(),
            theme: Theme::default(),
            keybindings: KeyBindings::default(),
        }
    }
}

/// Application state
///
/// Routes key presses to the focused component, turns row actions into
/// confirmed backend calls and keeps the loaded page in sync.
pub struct App {
    backend: Box<dyn DonationBackend>,
    context: PageContext,
    commands: UnboundedReceiver<RowCommand>,
    page: Page,

    table: DataTable,
    search: SearchBar,
    filters: ColumnFilters,
    show_filters: bool,
    focus: Focus,

    visibility_menu: Option<VisibilityMenu>,
    action_menu: Option<ActionMenu>,
    /// Dialog plus the command it guards
    confirm: Option<(ConfirmDialog, RowCommand)>,
    show_help: bool,

    status: Option<StatusMessage>,
    keybindings: KeyBindings,
    theme: Theme,
    should_quit: bool,
}

impl App {
    /// Create the app and load the starting page
    pub fn new(backend: Box<dyn DonationBackend>, options: AppOptions) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let context = PageContext::new(tx, &options.id_field, &options.base_url);
        let placeholder = DataTable::new(
            options.page.title(),
            Arc::new(options.page.columns(&context)?),
            Dataset::empty(&options.id_field),
        );

        let mut app = Self {
            backend,
            context,
            commands: rx,
            page: options.page,
            table: placeholder,
            search: SearchBar::new().with_theme(options.theme.clone()),
            filters: ColumnFilters::new().with_theme(options.theme.clone()),
            show_filters: false,
            focus: Focus::Table,
            visibility_menu: None,
            action_menu: None,
            confirm: None,
            show_help: false,
            status: None,
            keybindings: options.keybindings,
            theme: options.theme,
            should_quit: false,
        };
        app.load_page(options.page)?;
        Ok(app)
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DataTable {
        &mut self.table
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Command awaiting confirmation, if any
    pub fn pending_command(&self) -> Option<&RowCommand> {
        self.confirm.as_ref().map(|(_, command)| command)
    }

    pub fn is_action_menu_open(&self) -> bool {
        self.action_menu.is_some()
    }

    pub fn is_visibility_menu_open(&self) -> bool {
        self.visibility_menu.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    fn set_message(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    /// Build the table for a page and fetch its records
    ///
    /// A failed fetch leaves an empty table and reports the error; the
    /// operator can refresh once the backend is reachable.
    pub fn load_page(&mut self, page: Page) -> Result<()> {
        let schema = Arc::new(page.columns(&self.context)?);
        let dataset = match self.backend.fetch(page) {
            Ok(dataset) => {
                info!(
                    page = %page,
                    rows = dataset.len(),
                    backend = self.backend.name(),
                    "Loaded page"
                );
                self.status = None;
                dataset
            }
            Err(e) => {
                error!(page = %page, "Failed to load donations: {e}");
                self.set_error(format!("Failed to load {}: {e}", page.title()));
                Dataset::empty(&self.context.id_field)
            }
        };

        let mut table =
            DataTable::new(page.title(), schema, dataset).with_theme(self.theme.clone());
        table.set_clear_search_hint(self.keybindings.hint_for(Action::ClearSearch));

        self.page = page;
        self.table = table;
        self.search.clear();
        self.set_focus(Focus::Table);
        self.visibility_menu = None;
        self.action_menu = None;
        self.sync_filters();
        Ok(())
    }

    /// Re-fetch the current page, keeping filters, sort and visibility
    pub fn refresh(&mut self) {
        match self.backend.fetch(self.page) {
            Ok(dataset) => {
                let count = dataset.len();
                self.table.set_dataset(dataset);
                self.set_message(format!("Loaded {count} donations"));
            }
            Err(e) => {
                error!(page = %self.page, "Refresh failed: {e}");
                self.set_error(format!("Failed to load {}: {e}", self.page.title()));
            }
        }
    }

    fn sync_filters(&mut self) {
        let view = self.table.view();
        self.filters.sync(&view, self.table.store());
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.table.set_focused(focus == Focus::Table);
        self.search.set_focused(focus == Focus::Search);
        self.filters.set_focused(focus == Focus::ColumnFilters);
    }

    /// Handle a key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let action = self.keybindings.get_action(&key);

        if self.confirm.is_some() {
            return self.handle_confirm_key(key, action);
        }
        if let Some(menu) = &mut self.action_menu {
            match action {
                Some(Action::Confirm) => {
                    let menu = self.action_menu.take();
                    if let Some(menu) = menu {
                        debug!(action = menu.selected_label(), "Running row action");
                        menu.invoke_selected();
                    }
                    self.drain_commands();
                }
                Some(Action::Cancel) => self.action_menu = None,
                Some(other) => {
                    menu.handle_action(other)?;
                }
                None => {}
            }
            return Ok(());
        }
        if let Some(menu) = &mut self.visibility_menu {
            match action {
                Some(Action::Confirm) => {
                    menu.activate(self.table.store_mut());
                    self.table.clamp_cursor();
                    self.sync_filters();
                }
                Some(Action::Cancel | Action::ToggleVisibilityMenu) => self.visibility_menu = None,
                Some(Action::Quit) => self.should_quit = true,
                Some(other) => {
                    menu.handle_action(other)?;
                }
                None => {}
            }
            return Ok(());
        }
        if self.show_help {
            match action {
                Some(Action::Quit) => self.should_quit = true,
                Some(Action::ToggleHelp | Action::Cancel) => self.show_help = false,
                _ => {}
            }
            return Ok(());
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key, action),
            Focus::ColumnFilters => self.handle_filters_key(key, action),
            Focus::Table => match action {
                Some(action) => self.handle_action(action),
                None => Ok(()),
            },
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: Option<Action>) -> Result<()> {
        let accept = match (key.code, action) {
            (KeyCode::Char('y'), _) => Some(true),
            (KeyCode::Char('n'), _) | (_, Some(Action::Cancel)) => Some(false),
            (_, Some(Action::Confirm)) => self
                .confirm
                .as_ref()
                .map(|(dialog, _)| dialog.is_yes_selected()),
            (_, Some(other)) => {
                if let Some((dialog, _)) = &mut self.confirm {
                    dialog.handle_action(other)?;
                }
                None
            }
            (_, None) => None,
        };

        if let Some(accept) = accept
            && let Some((_, command)) = self.confirm.take()
        {
            if accept {
                self.run_command(command);
            } else {
                debug!(?command, "Row command cancelled");
                self.set_message("Cancelled");
            }
            // Another action may have been queued behind this one
            self.drain_commands();
        }
        Ok(())
    }

    /// Keys while typing in the search box
    fn handle_search_key(&mut self, key: KeyEvent, action: Option<Action>) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Down => self.set_focus(Focus::Table),
            KeyCode::Tab if self.show_filters => self.set_focus(Focus::ColumnFilters),
            KeyCode::Tab | KeyCode::BackTab => {}
            _ if action == Some(Action::ClearInput) => {
                self.search.clear();
                self.table.store_mut().set_global_filter("");
                self.table.clamp_cursor();
            }
            _ => {
                if self.search.handle_key(key) {
                    let query = self.search.value();
                    self.table.store_mut().set_global_filter(query);
                    self.table.clamp_cursor();
                }
            }
        }
        Ok(())
    }

    /// Keys while typing in a column filter
    fn handle_filters_key(&mut self, key: KeyEvent, action: Option<Action>) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.set_focus(Focus::Table),
            KeyCode::Up | KeyCode::BackTab => {
                self.filters.handle_action(Action::MoveUp)?;
            }
            KeyCode::Down | KeyCode::Tab => {
                self.filters.handle_action(Action::MoveDown)?;
            }
            _ if action == Some(Action::ClearInput) => {
                if let Some(column) = self.filters.clear_selected() {
                    self.table.store_mut().clear_column_filter(&column);
                    self.table.clamp_cursor();
                    self.sync_filters();
                }
            }
            _ => {
                if let Some((column, value)) = self.filters.handle_key(key) {
                    self.table.store_mut().set_column_filter(&column, value);
                    self.table.clamp_cursor();
                    self.sync_filters();
                }
            }
        }
        Ok(())
    }

    /// Handle an action while the table has focus
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Cancel => self.status = None,
            Action::FocusSearch => self.set_focus(Focus::Search),
            Action::ClearSearch => {
                self.search.clear();
                self.table.store_mut().set_global_filter("");
                self.table.clamp_cursor();
            }
            Action::ToggleColumnFilters => {
                self.show_filters = !self.show_filters;
                if self.show_filters {
                    self.sync_filters();
                    if !self.filters.is_empty() {
                        self.set_focus(Focus::ColumnFilters);
                    }
                }
            }
            Action::ClearColumnFilters => {
                self.table.store_mut().clear_column_filters();
                self.filters.clear_all();
                self.table.clamp_cursor();
                self.sync_filters();
            }
            Action::ToggleVisibilityMenu => {
                self.visibility_menu =
                    Some(VisibilityMenu::new(self.table.store()).with_theme(self.theme.clone()));
            }
            Action::ShowAllColumns => {
                self.table.store_mut().show_all_columns();
                self.table.clamp_cursor();
                self.sync_filters();
            }
            Action::HideAllColumns => {
                self.table.store_mut().hide_all_columns();
                self.table.clamp_cursor();
                self.sync_filters();
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Refresh => self.refresh(),
            Action::ResetView => {
                self.table.store_mut().reset();
                self.search.clear();
                self.table.clamp_cursor();
                self.sync_filters();
            }
            Action::NextPage => self.load_page(self.page.next())?,
            Action::PrevPage => self.load_page(self.page.prev())?,
            Action::Confirm => self.activate_cell(),
            other => {
                self.table.handle_action(other)?;
                if other == Action::HideColumn {
                    self.sync_filters();
                }
            }
        }
        Ok(())
    }

    /// Enter on a cell: run or choose a row action on action columns
    fn activate_cell(&mut self) {
        let Some((row, actions)) = self.table.current_row_actions() else {
            return;
        };
        if let [only] = actions.as_slice() {
            debug!(action = %only.label, "Running row action");
            only.invoke(&row);
            self.drain_commands();
            return;
        }
        let title = row
            .id(&self.context.id_field)
            .map(|id| format!("Donation {id}"))
            .unwrap_or_else(|| "Row actions".to_string());
        self.action_menu =
            ActionMenu::new(title, row, actions).map(|menu| menu.with_theme(self.theme.clone()));
    }

    /// Queue the next row command behind a confirmation dialog
    fn drain_commands(&mut self) {
        while self.confirm.is_none() {
            let Ok(command) = self.commands.try_recv() else {
                break;
            };
            let dialog = ConfirmDialog::new("Confirm", command.prompt()).with_theme(self.theme.clone());
            self.confirm = Some((dialog, command));
        }
    }

    /// Forward a confirmed command to the backend and apply the result locally
    fn run_command(&mut self, command: RowCommand) {
        match command {
            RowCommand::Delete { id } => match self.backend.delete(self.page, &id) {
                Ok(()) => {
                    info!(page = %self.page, id, "Deleted donation");
                    if !self.table.remove_row(&id) {
                        warn!(id, "Deleted donation was not in the loaded page");
                    }
                    self.set_message(format!("Donation {id} deleted"));
                }
                Err(e) => {
                    error!(page = %self.page, id, "Delete failed: {e}");
                    self.set_error("Failed to delete donation. Please try again.");
                }
            },
            RowCommand::SetStatus { id, status } => {
                match self.backend.update_status(self.page, &id, &status) {
                    Ok(persisted) => {
                        info!(page = %self.page, id, status, persisted, "Updated donation status");
                        self.table
                            .update_field(&id, "status", Value::String(status.clone()));
                        if persisted {
                            self.set_message(format!("Donation {id} marked as {status}"));
                        } else {
                            self.set_message(format!(
                                "Donation {id} marked as {status} (not saved to server)"
                            ));
                        }
                    }
                    Err(e) => {
                        error!(page = %self.page, id, "Status update failed: {e}");
                        self.set_error("Failed to update status. Please try again.");
                    }
                }
            }
        }
        self.table.clamp_cursor();
    }

    /// Update app state (called on every tick)
    pub fn update(&mut self) -> Result<()> {
        self.drain_commands();
        self.table.update()?;
        Ok(())
    }

    /// Render the app
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let filters_height = if self.show_filters {
            self.filters.desired_height().min(area.height / 3).max(4)
        } else {
            0
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(filters_height),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_tabs(frame, chunks[0]);
        self.search.render(frame, chunks[1]);
        if self.show_filters {
            self.sync_filters();
            self.filters.render(frame, chunks[2]);
        }
        self.table.render(frame, chunks[3]);
        self.render_status_bar(frame, chunks[4]);

        if let Some(menu) = &mut self.visibility_menu {
            let height = menu.desired_height().min(area.height);
            let popup = Self::centered_rect(40, 100, area);
            let popup = Rect {
                y: area.y + area.height.saturating_sub(height) / 2,
                height,
                ..popup
            };
            menu.render(frame, popup);
        }
        if let Some(menu) = &mut self.action_menu {
            let (width, height) = menu.desired_size();
            let popup = Self::sized_rect(width, height, area);
            menu.render(frame, popup);
        }
        if let Some((dialog, _)) = &mut self.confirm {
            dialog.render(frame, area);
        }
        if self.show_help {
            self.render_help(frame, Self::centered_rect(70, 80, area));
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let selected = Page::ALL.iter().position(|p| *p == self.page).unwrap_or(0);
        let titles: Vec<&str> = Page::ALL.iter().map(|p| p.title()).collect();
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(self.theme.muted_style())
            .highlight_style(self.theme.header_selected_style());
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(24)])
            .split(area);

        let left = match &self.status {
            Some(message) if message.is_error => {
                Line::styled(message.text.clone(), self.theme.error_style())
            }
            Some(message) => Line::styled(message.text.clone(), self.theme.success_style()),
            None => Line::styled(
                self.keybindings.instructions(&[
                    Action::FocusSearch,
                    Action::ToggleColumnFilters,
                    Action::ToggleVisibilityMenu,
                    Action::CycleSort,
                    Action::NextPage,
                    Action::ToggleHelp,
                    Action::Quit,
                ]),
                self.theme.muted_style(),
            ),
        };
        frame.render_widget(Paragraph::new(left), halves[0]);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" source: ", self.theme.muted_style()),
                Span::styled(self.backend.name().to_string(), self.theme.info_style()),
            ]))
            .alignment(Alignment::Right),
            halves[1],
        );
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for (category, entries) in self.keybindings.help_sections() {
            lines.push(Line::styled(category.to_string(), self.theme.header_style()));
            for (keys, description) in entries {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<22}"), self.theme.info_style()),
                    Span::raw(description),
                ]));
            }
            lines.push(Line::from(""));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Help ")
            .border_style(self.theme.focused_border_style());
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// Helper to create centered rectangle
    fn centered_rect(percent_w: u16, percent_h: u16, area: Rect) -> Rect {
        let width = (area.width * percent_w) / 100;
        let height = (area.height * percent_h) / 100;
        Self::sized_rect(width, height, area)
    }

    fn sized_rect(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Row;
    use crate::services::{FileBackend, ServiceError};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    fn rows() -> Vec<Row> {
        [
            json!({"_id": "1", "fullName": "Asha Rao", "email": "asha@example.org", "amount": 500, "status": "new"}),
            json!({"_id": "2", "fullName": "Bilal Khan", "email": "bilal@example.org", "amount": 1500, "status": "processing"}),
            json!({"_id": "3", "fullName": "Chitra Iyer", "email": "chitra@example.org", "amount": 900, "status": "completed"}),
        ]
        .into_iter()
        .filter_map(Row::from_value)
        .collect()
    }

    fn app(page: Page) -> App {
        let backend = FileBackend::from_rows(rows(), "_id");
        App::new(
            Box::new(backend),
            AppOptions {
                page,
                base_url: "https://api.example.org/api/v1".to_string(),
                ..AppOptions::default()
            },
        )
        .unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn displayed(app: &mut App) -> usize {
        app.table_mut().view().displayed_rows()
    }

    /// Backend whose writes always fail
    struct BrokenBackend;

    impl DonationBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch(&mut self, _page: Page) -> Result<Dataset, ServiceError> {
            Ok(Dataset::from_rows(rows(), "_id"))
        }

        fn delete(&mut self, _page: Page, _id: &str) -> Result<(), ServiceError> {
            Err(ServiceError::Status {
                code: 500,
                body: "boom".to_string(),
            })
        }

        fn update_status(
            &mut self,
            _page: Page,
            _id: &str,
            _status: &str,
        ) -> Result<bool, ServiceError> {
            Err(ServiceError::Status {
                code: 500,
                body: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_search_filters_table() {
        let mut app = app(Page::InHonour);
        assert_eq!(displayed(&mut app), 3);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.focus(), Focus::Search);
        type_text(&mut app, "khan");
        assert_eq!(displayed(&mut app), 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus(), Focus::Table);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(displayed(&mut app), 3);
    }

    #[test]
    fn test_column_filter_panel() {
        let mut app = app(Page::InHonour);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.focus(), Focus::ColumnFilters);

        // First input is the name column
        type_text(&mut app, "asha");
        assert_eq!(displayed(&mut app), 1);
        assert_eq!(app.table().store().column_filter("fullName"), "asha");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('X'));
        assert_eq!(displayed(&mut app), 3);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app(Page::InHonour);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.pending_command(),
            Some(&RowCommand::Delete { id: "1".to_string() })
        );
        assert_eq!(displayed(&mut app), 3);

        press(&mut app, KeyCode::Enter);
        assert!(app.pending_command().is_none());
        assert_eq!(displayed(&mut app), 2);
        assert_eq!(app.status().unwrap().text, "Donation 1 deleted");
    }

    #[test]
    fn test_cancelled_delete_keeps_row() {
        let mut app = app(Page::InHonour);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert!(app.pending_command().is_none());
        assert_eq!(displayed(&mut app), 3);
    }

    #[test]
    fn test_failed_delete_reports_error() {
        let mut app = App::new(Box::new(BrokenBackend), AppOptions::default()).unwrap();
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('y'));
        let status = app.status().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Failed to delete donation. Please try again.");
        assert_eq!(displayed(&mut app), 3);
    }

    #[test]
    fn test_status_action_through_menu() {
        let mut app = app(Page::Enquiries);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Enter);
        assert!(app.is_action_menu_open());

        // new, processing, completed, failed: pick "completed"
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(!app.is_action_menu_open());
        assert_eq!(
            app.pending_command(),
            Some(&RowCommand::SetStatus {
                id: "1".to_string(),
                status: "completed".to_string()
            })
        );

        press(&mut app, KeyCode::Enter);
        let row = app.table_mut().current_row().unwrap();
        assert_eq!(row.resolve("status").to_display_string(), "completed");
    }

    #[test]
    fn test_page_navigation_resets_view() {
        let mut app = app(Page::InHonour);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "asha");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.page(), Page::InMemory);
        assert_eq!(app.table().store().global_filter(), "");

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.page(), Page::Enquiries);
    }

    #[test]
    fn test_visibility_menu_hides_column() {
        let mut app = app(Page::SpecialOccasion);
        let before = app.table_mut().view().visible_columns();
        press(&mut app, KeyCode::Char('v'));
        assert!(app.is_visibility_menu_open());
        // Show all, Hide all, then the first column
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert!(!app.is_visibility_menu_open());
        assert_eq!(app.table_mut().view().visible_columns(), before - 1);
        assert!(app.table().store().is_hidden("occasionDate"));
    }

    #[test]
    fn test_render_smoke() {
        let mut app = app(Page::InHonour);
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('?'));
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("In-Honour Donations"));
        assert!(screen.contains("Help"));
    }
}
