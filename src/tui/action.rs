use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    Home,
    End,
    GoToTop,
    GoToBottom,

    // Sorting
    CycleSort,
    ClearSort,

    // Filtering
    FocusSearch,
    ClearSearch,
    ToggleColumnFilters,
    ClearColumnFilters,
    ClearInput,

    // Columns
    ToggleVisibilityMenu,
    HideColumn,
    ShowAllColumns,
    HideAllColumns,

    // View
    ToggleHelp,
    Refresh,
    ResetView,

    // Pages
    NextPage,
    PrevPage,

    // Application
    Quit,
    Confirm,
    Cancel,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move cursor up",
            Action::MoveDown => "Move cursor down",
            Action::MoveLeft => "Move cursor left",
            Action::MoveRight => "Move cursor right",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::Home => "Go to first column",
            Action::End => "Go to last column",
            Action::GoToTop => "Go to first row",
            Action::GoToBottom => "Go to last row",
            Action::CycleSort => "Sort by column (asc, desc, off)",
            Action::ClearSort => "Clear sorting",
            Action::FocusSearch => "Search all columns",
            Action::ClearSearch => "Clear search",
            Action::ToggleColumnFilters => "Show column filters",
            Action::ClearColumnFilters => "Clear all column filters",
            Action::ClearInput => "Clear current input",
            Action::ToggleVisibilityMenu => "Choose visible columns",
            Action::HideColumn => "Hide current column",
            Action::ShowAllColumns => "Show all columns",
            Action::HideAllColumns => "Hide all columns",
            Action::ToggleHelp => "Toggle help screen",
            Action::Refresh => "Reload records",
            Action::ResetView => "Reset filters, sort and columns",
            Action::NextPage => "Next page",
            Action::PrevPage => "Previous page",
            Action::Quit => "Quit application",
            Action::Confirm => "Confirm or run row action",
            Action::Cancel => "Cancel or close",
        }
    }

    /// Get category for grouping in help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::PageUp
            | Action::PageDown
            | Action::Home
            | Action::End
            | Action::GoToTop
            | Action::GoToBottom => ActionCategory::Navigation,

            Action::CycleSort | Action::ClearSort => ActionCategory::Sorting,

            Action::FocusSearch
            | Action::ClearSearch
            | Action::ToggleColumnFilters
            | Action::ClearColumnFilters
            | Action::ClearInput => ActionCategory::Filtering,

            Action::ToggleVisibilityMenu
            | Action::HideColumn
            | Action::ShowAllColumns
            | Action::HideAllColumns => ActionCategory::Columns,

            Action::ToggleHelp | Action::Refresh | Action::ResetView => ActionCategory::View,

            Action::NextPage | Action::PrevPage => ActionCategory::Pages,

            Action::Quit | Action::Confirm | Action::Cancel => ActionCategory::Application,
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
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
            Action::FocusSearch,
            Action::ClearSearch,
            Action::ToggleColumnFilters,
            Action::ClearColumnFilters,
            Action::ClearInput,
            Action::ToggleVisibilityMenu,
            Action::HideColumn,
            Action::ShowAllColumns,
            Action::HideAllColumns,
            Action::ToggleHelp,
            Action::Refresh,
            Action::ResetView,
            Action::NextPage,
            Action::PrevPage,
            Action::Quit,
            Action::Confirm,
            Action::Cancel,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Sorting,
    Filtering,
    Columns,
    View,
    Pages,
    Application,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 7] {
        [
            ActionCategory::Navigation,
            ActionCategory::Sorting,
            ActionCategory::Filtering,
            ActionCategory::Columns,
            ActionCategory::View,
            ActionCategory::Pages,
            ActionCategory::Application,
        ]
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionCategory::Navigation => "Navigation",
            ActionCategory::Sorting => "Sorting",
            ActionCategory::Filtering => "Filtering",
            ActionCategory::Columns => "Columns",
            ActionCategory::View => "View",
            ActionCategory::Pages => "Pages",
            ActionCategory::Application => "Application",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_actions_have_descriptions() {
        for action in Action::all() {
            assert!(!action.description().is_empty());
        }
    }

    #[test]
    fn test_every_category_is_used() {
        let actions = Action::all();
        for category in ActionCategory::all() {
            assert!(
                actions.iter().any(|a| a.category() == category),
                "no action in {category}"
            );
        }
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::ToggleColumnFilters).unwrap();
        assert_eq!(json, "\"ToggleColumnFilters\"");

        let back: Action = serde_json::from_str("\"CycleSort\"").unwrap();
        assert_eq!(back, Action::CycleSort);
    }
}
