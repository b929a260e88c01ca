use crate::core::{Row, RowAction};
use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::sync::Arc;

/// Popup listing the row actions of one record
pub struct ActionMenu {
    row: Arc<Row>,
    actions: Vec<RowAction>,
    title: String,
    selected: usize,
    theme: Theme,
}

impl ActionMenu {
    /// Returns None when there is nothing to choose from
    pub fn new(title: impl Into<String>, row: Arc<Row>, actions: Vec<RowAction>) -> Option<Self> {
        if actions.is_empty() {
            return None;
        }
        Some(Self {
            row,
            actions,
            title: title.into(),
            selected: 0,
            theme: Theme::default(),
        })
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn selected_label(&self) -> &str {
        &self.actions[self.selected].label
    }

    /// Run the selected action against the row
    pub fn invoke_selected(&self) {
        self.actions[self.selected].invoke(&self.row);
    }

    pub fn desired_size(&self) -> (u16, u16) {
        let widest = self
            .actions
            .iter()
            .map(|a| a.label.chars().count())
            .chain(std::iter::once(self.title.chars().count()))
            .max()
            .unwrap_or(0) as u16;
        (widest + 8, self.actions.len() as u16 + 2)
    }
}

impl Component for ActionMenu {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        let count = self.actions.len();
        match action {
            Action::MoveDown => self.selected = (self.selected + 1) % count,
            Action::MoveUp => self.selected = (self.selected + count - 1) % count,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .actions
            .iter()
            .enumerate()
            .map(|(idx, action)| {
                let style = if idx == self.selected {
                    self.theme.selected_style()
                } else {
                    self.theme.normal_style()
                };
                Line::styled(format!(" {} ", action.label), style)
            })
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" {} ", self.title))
            .border_style(self.theme.focused_border_style());
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::MoveUp, Action::MoveDown, Action::Confirm, Action::Cancel]
    }

    fn name(&self) -> &str {
        "ActionMenu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_empty_actions_yield_no_menu() {
        let row = Arc::new(Row::from_value(json!({"_id": "1"})).unwrap());
        assert!(ActionMenu::new("Actions", row, Vec::new()).is_none());
    }

    #[test]
    fn test_invoke_selected_runs_callback_with_row() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let actions = vec![
            RowAction::new("Mark as Completed", |_| {}),
            RowAction::new("Delete", move |row: &Row| {
                log.lock().unwrap().push(row.id("_id").unwrap_or_default());
            }),
        ];
        let row = Arc::new(Row::from_value(json!({"_id": "abc"})).unwrap());
        let mut menu = ActionMenu::new("Actions", row, actions).unwrap();

        menu.handle_action(Action::MoveUp).unwrap();
        assert_eq!(menu.selected_label(), "Delete");
        menu.invoke_selected();
        assert_eq!(*seen.lock().unwrap(), vec!["abc".to_string()]);
    }
}
