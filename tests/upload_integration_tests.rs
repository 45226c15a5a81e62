use std::path::PathBuf;
use std::time::Duration;

use pdfchat::upload::{UploadClient, UploadError, UploadProgress};
use serde_json::json;
use tempfile::TempDir;
use tokio_test::assert_ok;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

fn write_pdf(dir: &TempDir, name: &str, size: usize) -> PathBuf {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(size, b'x');
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_upload_returns_descriptor_and_reports_progress() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"pdf\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileId": "abc",
            "fileName": "report.pdf",
            "pages": 10,
            "base64": "JVBERi0xLjQ="
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_pdf(&dir, "report.pdf", 200 * 1024);

    let client = UploadClient::new(mock_server.uri(), 1024 * 1024, Duration::from_secs(5)).unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let descriptor = assert_ok!(client.upload(&file, Some(tx)).await);

    assert_eq!(descriptor.file_id, "abc");
    assert_eq!(descriptor.pages, 10);
    assert_eq!(descriptor.document_ref().file_name, "report.pdf");

    let mut events: Vec<UploadProgress> = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(events.len() > 1, "expected several progress events");
    assert!(events.windows(2).all(|w| w[0].sent < w[1].sent));
    let last = events.last().unwrap();
    assert_eq!(last.sent, last.total);
    assert_eq!(last.total, 200 * 1024);
}

#[tokio::test]
async fn test_upload_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_pdf(&dir, "report.pdf", 1024);
    let client = UploadClient::new(mock_server.uri(), 1024 * 1024, Duration::from_secs(5)).unwrap();

    let err = client.upload(&file, None).await.unwrap_err();
    assert!(matches!(err, UploadError::Api { status: 500, ref message } if message == "disk full"));
    assert_eq!(err.to_string(), "upload failed: 500 disk full");
}

#[tokio::test]
async fn test_upload_malformed_descriptor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fileId": "abc"})))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_pdf(&dir, "report.pdf", 1024);
    let client = UploadClient::new(mock_server.uri(), 1024 * 1024, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        client.upload(&file, None).await,
        Err(UploadError::Parse(_))
    ));
}

#[tokio::test]
async fn test_oversized_file_never_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = write_pdf(&dir, "huge.pdf", 4096);
    let client = UploadClient::new(mock_server.uri(), 1024, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        client.upload(&file, None).await,
        Err(UploadError::TooLarge { size: 4096, limit: 1024 })
    ));
}
