use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::ExtractionError;

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Stable id derived from the content, not the name.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.bytes)
    }

    /// Extension decides first; files without a known extension are treated
    /// as PDF when they carry the PDF magic.
    pub fn kind(&self) -> Result<DocumentKind, ExtractionError> {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" | "md" => Ok(DocumentKind::PlainText),
            _ if self.bytes.starts_with(b"%PDF") => Ok(DocumentKind::Pdf),
            "" => Err(ExtractionError::UnsupportedFormat(format!(
                "{} has no extension and is not a PDF",
                self.file_name
            ))),
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// A document that could not be read, reported instead of silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFailure {
    pub file_name: String,
    pub fingerprint: String,
    pub reason: String,
}
