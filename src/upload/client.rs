use std::fmt;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc::UnboundedSender;

use crate::upload::{DocumentDescriptor, UploadProgress};

/// Body chunk size; one progress event is emitted per chunk.
const CHUNK_SIZE: usize = 64 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Splits the file into `CHUNK_SIZE` views over the same buffer.
fn body_chunks(bytes: Bytes) -> Vec<Bytes> {
    (0..bytes.len())
        .step_by(CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + CHUNK_SIZE).min(bytes.len())))
        .collect()
}

#[derive(Debug)]
pub enum UploadError {
    /// Not a `.pdf` file, or the contents don't start with `%PDF-`.
    NotPdf,
    TooLarge { size: u64, limit: u64 },
    Io(std::io::Error),
    Network(String),
    Api { status: u16, message: String },
    Parse(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NotPdf => write!(f, "please select a PDF file"),
            UploadError::TooLarge { limit, .. } => {
                write!(f, "file size must be less than {}MB", limit / (1024 * 1024))
            }
            UploadError::Io(e) => write!(f, "could not read file: {e}"),
            UploadError::Network(msg) => write!(f, "network error: {msg}"),
            UploadError::Api { status, message } => {
                write!(f, "upload failed: {status} {message}")
            }
            UploadError::Parse(msg) => write!(f, "unexpected upload response: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

pub struct UploadClient {
    base_url: String,
    max_bytes: u64,
    client: reqwest::Client,
}

impl UploadClient {
    pub fn new(
        base_url: impl Into<String>,
        max_bytes: u64,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/upload", self.base_url)
    }

    /// Uploads the PDF at `path`. If `progress` is given, an event is sent
    /// each time a chunk of the body is handed to the HTTP stack.
    pub async fn upload(
        &self,
        path: &Path,
        progress: Option<UnboundedSender<UploadProgress>>,
    ) -> Result<DocumentDescriptor, UploadError> {
        let is_pdf_name = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf_name {
            return Err(UploadError::NotPdf);
        }

        let size = tokio::fs::metadata(path).await.map_err(UploadError::Io)?.len();
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(UploadError::Io)?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(UploadError::NotPdf);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        info!("Starting upload: {} ({} bytes)", file_name, size);

        let total = bytes.len() as u64;
        let chunks = body_chunks(Bytes::from(bytes));
        let mut sent = 0u64;
        let body = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(tx) = &progress {
                let _ = tx.send(UploadProgress { sent, total });
            }
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| UploadError::Network(e.to_string()))?;
        let form = Form::new().part("pdf", part);

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Upload response status: {}", status);
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Upload failed with status {}: {}", status.as_u16(), body);
            return Err(UploadError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let descriptor: DocumentDescriptor =
            serde_json::from_str(&body).map_err(|e| UploadError::Parse(e.to_string()))?;
        info!(
            "Upload successful: file_id={}, pages={}",
            descriptor.file_id, descriptor.pages
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_bytes: u64) -> UploadClient {
        UploadClient::new("http://127.0.0.1:9", max_bytes, Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        assert!(matches!(
            client(1024).upload(&path, None).await,
            Err(UploadError::NotPdf)
        ));
    }

    #[tokio::test]
    async fn test_rejects_pdf_name_without_pdf_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"hello").unwrap();
        assert!(matches!(
            client(1024).upload(&path, None).await,
            Err(UploadError::NotPdf)
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.PDF");
        std::fs::write(&path, vec![b'%'; 2048]).unwrap();
        let err = client(1024).upload(&path, None).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size: 2048, limit: 1024 }));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.pdf");
        assert!(matches!(
            client(1024).upload(&path, None).await,
            Err(UploadError::Io(_))
        ));
    }

    #[test]
    fn test_body_chunks_share_the_file_buffer() {
        let file = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 10]);
        let chunks = body_chunks(file.clone());

        let lens: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(lens, vec![CHUNK_SIZE, CHUNK_SIZE, 10]);
        assert_eq!(chunks[0].as_ptr(), file.as_ptr());
        assert_eq!(chunks[2].as_ptr(), file[CHUNK_SIZE * 2..].as_ptr());
        assert!(body_chunks(Bytes::new()).is_empty());
    }

    #[test]
    fn test_too_large_message_uses_megabytes() {
        let err = UploadError::TooLarge {
            size: 60 * 1024 * 1024,
            limit: 50 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "file size must be less than 50MB");
    }
}
