use crate::core::{Dataset, Row};
use crate::pages::Page;
use crate::services::{DonationBackend, ServiceError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Offline backend over a JSON file of records
///
/// The file is read once; deletes and status changes apply to the
/// in-memory copy and are written back only by `save`.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    rows: Vec<Row>,
    id_field: String,
}

impl FileBackend {
    pub fn open(path: &Path, id_field: &str) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path)?;
        let payload: Value = serde_json::from_str(&content)?;
        let dataset = Dataset::from_json(payload, id_field)?;
        let rows = dataset.rows().iter().map(|row| row.as_ref().clone()).collect();
        info!(path = %path.display(), rows = dataset.len(), "Loaded donations file");
        Ok(Self {
            path: path.to_path_buf(),
            rows,
            id_field: id_field.to_string(),
        })
    }

    /// In-memory records, for callers that need a quick look
    pub fn from_rows(rows: Vec<Row>, id_field: &str) -> Self {
        Self {
            path: PathBuf::new(),
            rows,
            id_field: id_field.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current records back as a pretty-printed array
    pub fn save(&self, path: &Path) -> Result<(), ServiceError> {
        let records: Vec<Value> = self.rows.iter().map(|row| row.clone().into_value()).collect();
        let content = serde_json::to_string_pretty(&records)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, ServiceError> {
        self.rows
            .iter()
            .position(|row| row.id(&self.id_field).as_deref() == Some(id))
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}

impl DonationBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&mut self, page: Page) -> Result<Dataset, ServiceError> {
        debug!(page = %page, rows = self.rows.len(), "Serving donations from file");
        Ok(Dataset::from_rows(self.rows.clone(), &self.id_field))
    }

    fn delete(&mut self, _page: Page, id: &str) -> Result<(), ServiceError> {
        let index = self.position(id)?;
        self.rows.remove(index);
        Ok(())
    }

    fn update_status(
        &mut self,
        _page: Page,
        id: &str,
        status: &str,
    ) -> Result<bool, ServiceError> {
        let index = self.position(id)?;
        self.rows[index] = self.rows[index].with_field("status", Value::from(status));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn backend() -> FileBackend {
        let rows = vec![
            Row::from_value(json!({"_id": "a", "status": "processing"})).unwrap(),
            Row::from_value(json!({"_id": "b", "status": "processing"})).unwrap(),
        ];
        FileBackend::from_rows(rows, "_id")
    }

    #[test]
    fn test_delete_and_refetch() {
        let mut backend = backend();
        backend.delete(Page::InHonour, "a").unwrap();
        let dataset = backend.fetch(Page::InHonour).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(matches!(
            backend.delete(Page::InHonour, "a"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_status_persists_in_memory() {
        let mut backend = backend();
        assert!(backend.update_status(Page::InMemory, "b", "completed").unwrap());
        let dataset = backend.fetch(Page::InMemory).unwrap();
        let (_, row) = dataset.find("b").unwrap();
        assert_eq!(row.lookup("status"), Some(&json!("completed")));
    }
}
