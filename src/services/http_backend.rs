use crate::core::Dataset;
use crate::pages::Page;
use crate::services::{DonationBackend, Endpoint, ServiceError};
use reqwest::blocking::{Client as HttpClient, Response};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Backend talking to the donation API over HTTPS
///
/// Requests block the caller, so the UI loop stays synchronous.
pub struct HttpBackend {
    http: HttpClient,
    base_url: String,
    status_path: Option<String>,
    id_field: String,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        id_field: &str,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = HttpClient::builder()
            .user_agent(concat!("donation-tui/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            status_path: None,
            id_field: id_field.to_string(),
        })
    }

    /// Path accepting `{ id, status }` updates for every page
    pub fn with_status_path(mut self, status_path: Option<String>) -> Self {
        self.status_path = status_path;
        self
    }

    fn endpoint(&self, page: Page) -> Result<Endpoint, ServiceError> {
        page.endpoint(&self.base_url)
            .map(|endpoint| endpoint.with_status_path(self.status_path.clone()))
            .ok_or_else(|| ServiceError::NoEndpoint(page.title().to_string()))
    }

    fn get_json(&self, url: &str) -> Result<Value, ServiceError> {
        let response = check_status(self.http.get(url).send()?)?;
        Ok(response.json::<Value>()?)
    }

    fn post_json(&self, url: &str, body: Value) -> Result<(), ServiceError> {
        let response = check_status(self.http.post(url).json(&body).send()?)?;
        let status = response.status();
        let text = response.text().unwrap_or_default();

        // Some endpoints answer 200 with `success: false`
        if let Ok(reply) = serde_json::from_str::<Value>(&text)
            && reply.get("success") == Some(&Value::Bool(false))
        {
            return Err(ServiceError::Status {
                code: status.as_u16(),
                body: text,
            });
        }
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ServiceError::Status {
        code: status.as_u16(),
        body: response.text().unwrap_or_default(),
    })
}

impl DonationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&mut self, page: Page) -> Result<Dataset, ServiceError> {
        let url = self.endpoint(page)?.list_url();
        debug!(%url, "Fetching donations");
        let payload = self.get_json(&url)?;
        let dataset = Dataset::from_json(payload, &self.id_field)?;
        info!(page = %page, rows = dataset.len(), "Fetched donations");
        Ok(dataset)
    }

    fn delete(&mut self, page: Page, id: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(page)?.delete_url();
        debug!(%url, id, "Deleting donation");
        self.post_json(&url, json!({ "id": id }))?;
        info!(page = %page, id, "Deleted donation");
        Ok(())
    }

    fn update_status(
        &mut self,
        page: Page,
        id: &str,
        status: &str,
    ) -> Result<bool, ServiceError> {
        let Some(url) = self.endpoint(page)?.status_url() else {
            warn!(page = %page, id, "No status endpoint configured, keeping change local");
            return Ok(false);
        };
        self.post_json(&url, json!({ "id": id, "status": status }))?;
        info!(page = %page, id, status, "Updated donation status");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_without_endpoint_are_reported() {
        let mut backend =
            HttpBackend::new("https://api.example.org/api/v1", "_id", Duration::from_secs(1))
                .unwrap();
        let err = backend.fetch(Page::Sponsor).unwrap_err();
        assert!(matches!(err, ServiceError::NoEndpoint(_)));
    }

    #[test]
    fn test_status_path_is_applied_to_endpoints() {
        let backend =
            HttpBackend::new("https://api.example.org/api/v1", "_id", Duration::from_secs(1))
                .unwrap()
                .with_status_path(Some("enquiry/update-donation-status".to_string()));
        let endpoint = backend.endpoint(Page::InHonour).unwrap();
        assert_eq!(
            endpoint.status_url().as_deref(),
            Some("https://api.example.org/api/v1/enquiry/update-donation-status")
        );
    }
}
