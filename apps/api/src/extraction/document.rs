use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// An uploaded CV, ready to be sent inline to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct CvDocument {
    pub mime_type: String,
    /// Standard base64 of the raw file bytes.
    pub data: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("unsupported file type '{0}': upload a PDF or an image")]
    UnsupportedType(String),
}

impl CvDocument {
    /// Validates the declared media type (PDF or any image) and base64-encodes the payload.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !is_supported(&mime_type) {
            return Err(DocumentError::UnsupportedType(mime_type));
        }
        Ok(Self {
            mime_type,
            data: STANDARD.encode(bytes),
        })
    }
}

fn is_supported(mime_type: &str) -> bool {
    mime_type == "application/pdf"
        || mime_type
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_is_encoded() {
        let doc = CvDocument::from_bytes(b"%PDF-1.4", "application/pdf").unwrap();
        assert_eq!(doc.mime_type, "application/pdf");
        assert_eq!(doc.data, "JVBERi0xLjQ=");
    }

    #[test]
    fn test_images_accepted_and_mime_normalized() {
        let doc = CvDocument::from_bytes(&[0x89, 0x50], " Image/PNG ").unwrap();
        assert_eq!(doc.mime_type, "image/png");
    }

    #[test]
    fn test_rejects_empty_and_unsupported() {
        assert_eq!(
            CvDocument::from_bytes(b"", "application/pdf"),
            Err(DocumentError::Empty)
        );
        assert!(matches!(
            CvDocument::from_bytes(b"hello", "text/plain"),
            Err(DocumentError::UnsupportedType(_))
        ));
        assert!(CvDocument::from_bytes(b"x", "image/").is_err());
    }
}
