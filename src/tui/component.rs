use crate::tui::action::Action;
use color_eyre::Result;
use ratatui::{Frame, layout::Rect};

/// Base trait for the console's widgets
///
/// The app translates key presses into actions and offers them to the
/// component that owns focus.
pub trait Component {
    /// Handle an action
    ///
    /// Returns Ok(true) if the action was consumed, Ok(false) to let the
    /// caller try it elsewhere.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Draw into the given area
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Actions this component responds to, used for context help
    fn supported_actions(&self) -> &[Action];

    /// Component name for logging
    fn name(&self) -> &str;

    /// Called once per tick of the event loop
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Components that can hold keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        focused: bool,
        count: i32,
    }

    impl Component for Counter {
        fn handle_action(&mut self, action: Action) -> Result<bool> {
            match action {
                Action::MoveUp => self.count += 1,
                Action::MoveDown => self.count -= 1,
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect) {}

        fn supported_actions(&self) -> &[Action] {
            &[Action::MoveUp, Action::MoveDown]
        }

        fn name(&self) -> &str {
            "counter"
        }
    }

    impl Focusable for Counter {
        fn is_focused(&self) -> bool {
            self.focused
        }

        fn set_focused(&mut self, focused: bool) {
            self.focused = focused;
        }
    }

    #[test]
    fn test_component_action_handling() {
        let mut counter = Counter {
            focused: false,
            count: 0,
        };
        assert!(counter.handle_action(Action::MoveUp).unwrap());
        assert!(counter.handle_action(Action::MoveUp).unwrap());
        assert!(!counter.handle_action(Action::Quit).unwrap());
        assert_eq!(counter.count, 2);
        assert!(counter.update().is_ok());
    }

    #[test]
    fn test_focusable() {
        let mut counter = Counter {
            focused: false,
            count: 0,
        };
        counter.set_focused(true);
        assert!(counter.is_focused());
        assert_eq!(counter.name(), "counter");
        assert_eq!(counter.supported_actions().len(), 2);
    }
}
