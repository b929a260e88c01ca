pub mod action_menu;
pub mod column_filters;
pub mod confirm_dialog;
pub mod data_table;
pub mod search_bar;
pub mod visibility_menu;

pub use action_menu::ActionMenu;
pub use column_filters::ColumnFilters;
pub use confirm_dialog::ConfirmDialog;
pub use data_table::{DataTable, Position, Viewport};
pub use search_bar::SearchBar;
pub use visibility_menu::{MenuItem, VisibilityMenu};
