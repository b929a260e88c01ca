use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

/// Yes/No modal guarding destructive row commands
///
/// Enter accepts the highlighted button, Esc always declines.
pub struct ConfirmDialog {
    title: String,
    message: String,
    yes_selected: bool,
    theme: Theme,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            yes_selected: true,
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether Enter would confirm
    pub fn is_yes_selected(&self) -> bool {
        self.yes_selected
    }

    /// Modal rectangle centred in `area`, sized to the wrapped message
    pub fn modal_area(&self, area: Rect) -> Rect {
        let width = area.width.clamp(20, 56);
        let wrapped = textwrap::wrap(&self.message, width.saturating_sub(4) as usize);
        let height = (wrapped.len() as u16 + 5).min(area.height);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect {
            x,
            y,
            width: width.min(area.width),
            height,
        }
    }
}

impl Component for ConfirmDialog {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveLeft | Action::MoveRight => self.yes_selected = !self.yes_selected,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let modal = self.modal_area(area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .title(format!(" {} ", self.title))
            .border_style(self.theme.warning_style());
        let wrap_width = block.inner(modal).width.saturating_sub(2) as usize;

        let mut lines: Vec<Line> = textwrap::wrap(&self.message, wrap_width.max(1))
            .into_iter()
            .map(|line| Line::from(line.into_owned()))
            .collect();
        lines.push(Line::from(""));

        let button = |label: &'static str, active: bool| {
            let style = if active {
                self.theme.selected_style()
            } else {
                self.theme.muted_style()
            };
            Span::styled(label, style)
        };
        lines.push(Line::from(vec![
            button("[ Yes ]", self.yes_selected),
            Span::raw("   "),
            button("[ No ]", !self.yes_selected),
        ]));

        frame.render_widget(Clear, modal);
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block),
            modal,
        );
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::MoveLeft, Action::MoveRight, Action::Confirm, Action::Cancel]
    }

    fn name(&self) -> &str {
        "ConfirmDialog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_toggle_selection() {
        let mut dialog = ConfirmDialog::new("Confirm", "Delete donation 1?");
        assert!(dialog.is_yes_selected());
        assert!(dialog.handle_action(Action::MoveRight).unwrap());
        assert!(!dialog.is_yes_selected());
        assert!(!dialog.handle_action(Action::MoveDown).unwrap());
    }

    #[test]
    fn test_modal_fits_small_area() {
        let dialog = ConfirmDialog::new("Confirm", "Delete donation 1? This cannot be undone.");
        let area = Rect::new(0, 0, 30, 6);
        let modal = dialog.modal_area(area);
        assert!(modal.width <= area.width);
        assert!(modal.height <= area.height);
    }

    #[test]
    fn test_render_shows_message_and_buttons() {
        let mut dialog = ConfirmDialog::new("Confirm", "Mark donation 7 as completed?");
        let mut terminal = Terminal::new(TestBackend::new(70, 12)).unwrap();
        terminal
            .draw(|frame| dialog.render(frame, frame.area()))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Mark donation 7 as completed?"));
        assert!(screen.contains("[ Yes ]"));
        assert!(screen.contains("[ No ]"));
    }
}
