//! Boundary to the remote donation records API
//!
//! The table engine never talks to the network. Pages hand the app a
//! `DonationBackend`, the app fetches a `Dataset` from it and forwards
//! confirmed row actions back to it.

pub mod file_backend;
pub mod http_backend;

pub use file_backend::FileBackend;
pub use http_backend::HttpBackend;

use crate::core::{Dataset, PayloadError};
use crate::pages::Page;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no record with id '{0}'")]
    NotFound(String),

    #[error("{0} has no remote endpoint; load a file instead")]
    NoEndpoint(String),
}

/// Remote paths serving one page, relative to a base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub base_url: String,
    pub list_path: String,
    pub delete_path: String,
    /// Without a status path, status changes stay local
    pub status_path: Option<String>,
}

impl Endpoint {
    pub fn new(base_url: &str, list_path: &str, delete_path: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            list_path: list_path.to_string(),
            delete_path: delete_path.to_string(),
            status_path: None,
        }
    }

    pub fn with_status_path(mut self, status_path: Option<String>) -> Self {
        self.status_path = status_path;
        self
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn list_url(&self) -> String {
        self.join(&self.list_path)
    }

    pub fn delete_url(&self) -> String {
        self.join(&self.delete_path)
    }

    pub fn status_url(&self) -> Option<String> {
        self.status_path.as_deref().map(|path| self.join(path))
    }
}

/// Source of donation records and sink for row actions
pub trait DonationBackend {
    /// Short label for logs and the status bar
    fn name(&self) -> &str;

    /// Load every record for a page
    fn fetch(&mut self, page: Page) -> Result<Dataset, ServiceError>;

    /// Delete one record by id
    fn delete(&mut self, page: Page, id: &str) -> Result<(), ServiceError>;

    /// Persist a status change
    ///
    /// Returns false when the backend has nowhere to persist it, in which
    /// case the change only lives in the loaded dataset.
    fn update_status(&mut self, page: Page, id: &str, status: &str)
    -> Result<bool, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_urls_join_cleanly() {
        let endpoint = Endpoint::new(
            "https://api.example.org/api/v1/",
            "/enquiry/get-in-honour-donations",
            "enquiry/delete-in-honour-donation",
        );
        assert_eq!(
            endpoint.list_url(),
            "https://api.example.org/api/v1/enquiry/get-in-honour-donations"
        );
        assert_eq!(
            endpoint.delete_url(),
            "https://api.example.org/api/v1/enquiry/delete-in-honour-donation"
        );
        assert_eq!(endpoint.status_url(), None);

        let endpoint = endpoint.with_status_path(Some("enquiry/update-status".to_string()));
        assert_eq!(
            endpoint.status_url().as_deref(),
            Some("https://api.example.org/api/v1/enquiry/update-status")
        );
    }
}
