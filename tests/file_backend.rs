//! Integration tests for the offline JSON file backend

use donation_tui::pages::Page;
use donation_tui::services::{DonationBackend, FileBackend, ServiceError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, body: &Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(body).unwrap()).unwrap();
    path
}

#[test]
fn test_open_envelope_payload() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "honour.json",
        &json!({
            "success": true,
            "statusCode": 200,
            "data": [
                {"_id": "1", "fullName": "Asha Rao", "certificateDetails": {"certificateCity": "Pune"}},
                "not a record",
                {"_id": 2, "fullName": "Bilal Khan"}
            ]
        }),
    );

    let mut backend = FileBackend::open(&path, "_id").unwrap();
    assert_eq!(backend.path(), path.as_path());
    let dataset = backend.fetch(Page::InHonour).unwrap();
    // The string element is skipped
    assert_eq!(dataset.len(), 2);
    let (_, row) = dataset.find("2").unwrap();
    assert_eq!(row.resolve("fullName").to_display_string(), "Bilal Khan");
    let (_, row) = dataset.find("1").unwrap();
    assert_eq!(
        row.resolve("certificateDetails.certificateCity")
            .to_display_string(),
        "Pune"
    );
}

#[test]
fn test_rejected_envelope_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "rejected.json",
        &json!({"success": false, "message": "Unauthorized", "data": []}),
    );
    assert!(matches!(
        FileBackend::open(&path, "_id"),
        Err(ServiceError::InvalidPayload(_))
    ));
}

#[test]
fn test_missing_and_malformed_files() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        FileBackend::open(&dir.path().join("missing.json"), "_id"),
        Err(ServiceError::Io(_))
    ));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(
        FileBackend::open(&broken, "_id"),
        Err(ServiceError::Json(_))
    ));
}

#[test]
fn test_changes_save_back_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "enquiries.json",
        &json!([
            {"_id": "e1", "name": "Asha", "status": "new"},
            {"_id": "e2", "name": "Bilal", "status": "new"}
        ]),
    );

    let mut backend = FileBackend::open(&path, "_id").unwrap();
    assert!(backend.update_status(Page::Enquiries, "e2", "completed").unwrap());
    backend.delete(Page::Enquiries, "e1").unwrap();

    let out = dir.path().join("out").join("enquiries.json");
    backend.save(&out).unwrap();

    let reopened = FileBackend::open(&out, "_id").unwrap();
    let mut reopened: Box<dyn DonationBackend> = Box::new(reopened);
    let dataset = reopened.fetch(Page::Enquiries).unwrap();
    assert_eq!(dataset.len(), 1);
    let (_, row) = dataset.find("e2").unwrap();
    assert_eq!(row.resolve("status").to_display_string(), "completed");
    assert_eq!(reopened.name(), "file");
}
