use crate::core::TableStore;
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    ShowAll,
    HideAll,
    Column {
        id: String,
        header: String,
        visible: bool,
    },
}

/// Checklist of hideable columns with bulk show/hide entries
pub struct VisibilityMenu {
    items: Vec<MenuItem>,
    hidden: usize,
    selected: usize,
    focused: bool,
    theme: Theme,
}

impl VisibilityMenu {
    pub fn new(store: &TableStore) -> Self {
        let mut menu = Self {
            items: Vec::new(),
            hidden: 0,
            selected: 0,
            focused: true,
            theme: Theme::default(),
        };
        menu.sync(store);
        menu
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn sync(&mut self, store: &TableStore) {
        let mut items = vec![MenuItem::ShowAll, MenuItem::HideAll];
        items.extend(
            store
                .schema()
                .iter()
                .filter(|column| column.can_hide())
                .map(|column| MenuItem::Column {
                    id: column.id().to_string(),
                    header: column.header_label(),
                    visible: !store.is_hidden(column.id()),
                }),
        );
        self.items = items;
        self.hidden = store.hidden_count();
        self.selected = self.selected.min(self.items.len() - 1);
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn selected(&self) -> &MenuItem {
        &self.items[self.selected]
    }

    /// Apply the selected entry to the store; returns true if state changed
    pub fn activate(&mut self, store: &mut TableStore) -> bool {
        let changed = match &self.items[self.selected] {
            MenuItem::ShowAll => store.show_all_columns(),
            MenuItem::HideAll => store.hide_all_columns(),
            MenuItem::Column { id, .. } => store.toggle_column_visibility(id),
        };
        self.sync(store);
        changed
    }

    /// Rows needed for every entry plus borders and the summary line
    pub fn desired_height(&self) -> u16 {
        self.items.len() as u16 + 4
    }

    fn item_line(&self, idx: usize, item: &MenuItem) -> Line<'static> {
        let text = match item {
            MenuItem::ShowAll => "Show all".to_string(),
            MenuItem::HideAll => "Hide all".to_string(),
            MenuItem::Column {
                header, visible, ..
            } => format!("[{}] {}", if *visible { "x" } else { " " }, header),
        };
        let style = if idx == self.selected {
            self.theme.selected_style()
        } else {
            match item {
                MenuItem::Column { .. } => self.theme.normal_style(),
                _ => self.theme.info_style(),
            }
        };
        Line::styled(format!(" {text} "), style)
    }
}

impl Component for VisibilityMenu {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveDown => self.selected = (self.selected + 1) % self.items.len(),
            Action::MoveUp => {
                self.selected = (self.selected + self.items.len() - 1) % self.items.len()
            }
            Action::GoToTop => self.selected = 0,
            Action::GoToBottom => self.selected = self.items.len() - 1,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.hidden > 0 {
            format!(" Columns ({} hidden) ", self.hidden)
        } else {
            " Columns ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(self.theme.border_for(self.focused));

        let mut lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| self.item_line(idx, item))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::styled(
            "Enter: toggle  Esc: close",
            self.theme.muted_style(),
        ));

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[
            Action::MoveUp,
            Action::MoveDown,
            Action::GoToTop,
            Action::GoToBottom,
            Action::Confirm,
            Action::Cancel,
        ]
    }

    fn name(&self) -> &str {
        "VisibilityMenu"
    }
}

impl Focusable for VisibilityMenu {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
