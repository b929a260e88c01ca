#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod pages;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use core::{ColumnDescriptor, ColumnSchema, Dataset, Row, TableStore, ViewModel, derive};
pub use pages::{Page, RowCommand};
pub use services::{DonationBackend, FileBackend, HttpBackend, ServiceError};
pub use tui::{Action, ActionCategory, App, AppOptions};
