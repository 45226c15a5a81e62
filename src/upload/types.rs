use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::core::state::DocumentRef;

/// What the backend returns for an uploaded PDF.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub file_id: String,
    pub file_name: String,
    pub pages: u32,
    /// The PDF itself, base64 encoded, for the renderer.
    pub base64: String,
}

impl DocumentDescriptor {
    pub fn document_ref(&self) -> DocumentRef {
        DocumentRef {
            file_id: self.file_id.clone(),
            file_name: self.file_name.clone(),
            pages: self.pages,
        }
    }

    /// Decodes the embedded PDF payload.
    pub fn pdf_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.base64.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_parses_backend_shape() {
        let json = r#"{"fileId":"abc","fileName":"report.pdf","pages":10,"base64":"JVBERi0xLjQ="}"#;
        let descriptor: DocumentDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(
            descriptor.document_ref(),
            DocumentRef {
                file_id: "abc".into(),
                file_name: "report.pdf".into(),
                pages: 10,
            }
        );
        assert_eq!(descriptor.pdf_bytes().unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_bad_payload_does_not_decode() {
        let descriptor = DocumentDescriptor {
            file_id: "a".into(),
            file_name: "a.pdf".into(),
            pages: 1,
            base64: "not base64!".into(),
        };
        assert!(descriptor.pdf_bytes().is_err());
    }

    #[test]
    fn test_percent() {
        assert_eq!(UploadProgress { sent: 0, total: 200 }.percent(), 0);
        assert_eq!(UploadProgress { sent: 50, total: 200 }.percent(), 25);
        assert_eq!(UploadProgress { sent: 200, total: 200 }.percent(), 100);
        assert_eq!(UploadProgress { sent: 0, total: 0 }.percent(), 100);
    }
}
