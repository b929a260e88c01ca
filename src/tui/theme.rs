use crate::core::Tone;
use ratatui::style::{Color, Modifier, Style};

/// Colour scheme for the console
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub row_alt_bg: Color,

    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            background: Color::Reset,
            foreground: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            header_fg: Color::Cyan,
            header_bg: Color::Reset,
            selected_fg: Color::Black,
            selected_bg: Color::Cyan,
            row_alt_bg: Color::Rgb(25, 25, 35),
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
            accent: Color::Magenta,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Blue,
            header_fg: Color::Blue,
            header_bg: Color::Rgb(240, 240, 240),
            selected_fg: Color::White,
            selected_bg: Color::Blue,
            row_alt_bg: Color::Rgb(245, 245, 250),
            success: Color::Rgb(0, 130, 0),
            error: Color::Red,
            // Darker yellow stays readable on white
            warning: Color::Rgb(200, 150, 0),
            info: Color::Blue,
            accent: Color::Rgb(130, 0, 160),
        }
    }

    /// Theme by config name; anything other than "light" is dark
    pub fn by_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("light") {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Header cell under the cursor column
    pub fn header_selected_style(&self) -> Style {
        self.header_style().add_modifier(Modifier::REVERSED)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the currently active cell
    pub fn selected_cell_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn alt_row_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.row_alt_bg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn border_for(&self, focused: bool) -> Style {
        if focused {
            self.focused_border_style()
        } else {
            self.border_style()
        }
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Small inverted label, used for counts and active filters
    pub fn badge_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Foreground for a rendered cell tone; plain cells inherit the row style
    pub fn tone_style(&self, tone: Tone) -> Style {
        match tone {
            Tone::Plain => Style::default(),
            Tone::Success => self.success_style().add_modifier(Modifier::BOLD),
            Tone::Warning => self.warning_style().add_modifier(Modifier::BOLD),
            Tone::Danger => self.error_style().add_modifier(Modifier::BOLD),
            Tone::Muted => self.muted_style().add_modifier(Modifier::ITALIC),
            Tone::Accent => Style::default().fg(self.accent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_theme_is_dark() {
        let theme = Theme::default();
        assert_eq!(theme.name, "Dark");
        assert_ne!(theme.header_fg, Color::Reset);
        assert_ne!(theme.selected_bg, Color::Reset);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("LIGHT").name, "Light");
        assert_eq!(Theme::by_name("solarized").name, "Dark");
    }

    #[test]
    fn test_tone_styles() {
        let theme = Theme::default();
        assert_eq!(theme.tone_style(Tone::Success).fg, Some(theme.success));
        assert_eq!(theme.tone_style(Tone::Danger).fg, Some(theme.error));
        assert_eq!(theme.tone_style(Tone::Plain), Style::default());
    }

    #[test]
    fn test_style_helpers() {
        let theme = Theme::light();
        let header = theme.header_style();
        assert!(header.add_modifier.contains(Modifier::BOLD));

        let selected = theme.selected_style();
        assert_eq!(selected.fg, Some(theme.selected_fg));
        assert_eq!(selected.bg, Some(theme.selected_bg));
    }
}
