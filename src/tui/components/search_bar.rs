//! Global search input shown above the table

use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders},
};
use tui_textarea::{CursorMove, TextArea};

pub struct SearchBar {
    input: TextArea<'static>,
    focused: bool,
    theme: Theme,
}

impl Default for SearchBar {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            input: Self::fresh_input(""),
            focused: false,
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn fresh_input(value: &str) -> TextArea<'static> {
        let mut input = TextArea::new(vec![value.to_string()]);
        input.set_placeholder_text("Search all columns...");
        input.set_cursor_line_style(Style::default());
        input.move_cursor(CursorMove::End);
        input
    }

    /// Current query text
    pub fn value(&self) -> String {
        self.input.lines().first().cloned().unwrap_or_default()
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Self::fresh_input(value);
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    /// Feed a raw key into the input; returns true if the text changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Single line input
        if key.code == KeyCode::Enter {
            return false;
        }
        self.input.input(key)
    }
}

impl Component for SearchBar {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::ClearInput | Action::ClearSearch => {
                self.clear();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.focused {
            " Search (Enter to return to table) "
        } else {
            " Search "
        };
        self.input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(self.theme.border_for(self.focused)),
        );
        let cursor_style = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.input.set_cursor_style(cursor_style);
        frame.render_widget(&self.input, area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::ClearInput, Action::ClearSearch]
    }

    fn name(&self) -> &str {
        "SearchBar"
    }
}

impl Focusable for SearchBar {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
