use std::sync::Arc;

use crate::document::{Document, DocumentKind, ExtractionFailure};
use crate::ocr::OcrEngine;
use crate::pdf::{PdfTextExtractor, PdfTextLayer};
use crate::ExtractionError;

/// A text layer shorter than this (trimmed, in characters) is treated as a
/// scanned document and sent to OCR.
pub const MIN_TEXT_LAYER_CHARS: usize = 100;

/// Combined result of reading several uploads.
#[derive(Debug, Default)]
pub struct ExtractionBatch {
    /// Each readable document's text, prefixed with a newline.
    pub text: String,
    pub extracted: usize,
    pub failures: Vec<ExtractionFailure>,
}

#[derive(Clone)]
pub struct DocumentExtractor {
    pdf: Arc<dyn PdfTextLayer>,
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl DocumentExtractor {
    pub fn new(ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self::with_text_layer(Arc::new(PdfTextExtractor), ocr)
    }

    pub fn with_text_layer(pdf: Arc<dyn PdfTextLayer>, ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self { pdf, ocr }
    }

    pub async fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        match document.kind()? {
            DocumentKind::PlainText => String::from_utf8(document.bytes.clone())
                .map_err(|e| ExtractionError::Encoding(format!("{}: {}", document.file_name, e))),
            DocumentKind::Pdf => self.extract_pdf(document).await,
        }
    }

    async fn extract_pdf(&self, document: &Document) -> Result<String, ExtractionError> {
        let pdf = Arc::clone(&self.pdf);
        let bytes = document.bytes.clone();

        // pdf-extract can panic on malformed input; a panicked task surfaces as a JoinError.
        let text = tokio::task::spawn_blocking(move || pdf.extract_text(&bytes))
            .await
            .map_err(|e| ExtractionError::PdfParsing(format!("text layer task failed: {}", e)))??;

        let text_chars = text.trim().chars().count();
        if text_chars >= MIN_TEXT_LAYER_CHARS {
            return Ok(text);
        }

        let Some(ocr) = &self.ocr else {
            tracing::debug!(
                file = %document.file_name,
                chars = text_chars,
                "Short text layer and OCR disabled"
            );
            return Ok(text);
        };

        tracing::info!(
            file = %document.file_name,
            chars = text_chars,
            "Text layer too short, falling back to OCR"
        );
        ocr.ocr_pdf(&document.bytes).await
    }

    /// Extract every document, continuing past failures.
    pub async fn extract_all(&self, documents: &[Document]) -> ExtractionBatch {
        let mut batch = ExtractionBatch::default();

        for document in documents {
            match self.extract(document).await {
                Ok(text) => {
                    batch.text.push('\n');
                    batch.text.push_str(&text);
                    batch.extracted += 1;
                }
                Err(e) => {
                    tracing::warn!(file = %document.file_name, error = %e, "Skipping unreadable document");
                    batch.failures.push(ExtractionFailure {
                        file_name: document.file_name.clone(),
                        fingerprint: document.fingerprint(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTextLayer(&'static str);

    impl PdfTextLayer for FixedTextLayer {
        fn extract_text(&self, _: &[u8]) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    struct PanickingTextLayer;

    impl PdfTextLayer for PanickingTextLayer {
        fn extract_text(&self, _: &[u8]) -> Result<String, ExtractionError> {
            panic!("malformed xref table");
        }
    }

    #[derive(Default)]
    struct CountingOcr {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrEngine for CountingOcr {
        async fn ocr_pdf(&self, _: &[u8]) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("scanned page text".to_string())
        }
    }

    fn long_text() -> &'static str {
        "Acme builds solar microgrids for remote farms. Revenue grew 40% last year \
         with three enterprise pilots and a signed distribution partner."
    }

    #[tokio::test]
    async fn test_plain_text_is_decoded() {
        let extractor = DocumentExtractor::new(None);
        let text = extractor.extract(&Document::new("pitch.md", "# Acme\nWe sell.")).await.unwrap();
        assert_eq!(text, "# Acme\nWe sell.");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_encoding_error() {
        let extractor = DocumentExtractor::new(None);
        let result = extractor.extract(&Document::new("pitch.txt", vec![0xffu8, 0xfe, 0x00])).await;
        assert!(matches!(result, Err(ExtractionError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_long_text_layer_skips_ocr() {
        let ocr = Arc::new(CountingOcr::default());
        let extractor =
            DocumentExtractor::with_text_layer(Arc::new(FixedTextLayer(long_text())), Some(ocr.clone()));

        let text = extractor.extract(&Document::new("deck.pdf", "%PDF")).await.unwrap();

        assert_eq!(text, long_text());
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_text_layer_falls_back_to_ocr() {
        let ocr = Arc::new(CountingOcr::default());
        let extractor =
            DocumentExtractor::with_text_layer(Arc::new(FixedTextLayer("  Page 1  ")), Some(ocr.clone()));

        let text = extractor.extract(&Document::new("scan.pdf", "%PDF")).await.unwrap();

        assert_eq!(text, "scanned page text");
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_text_layer_kept_without_ocr() {
        let extractor = DocumentExtractor::with_text_layer(Arc::new(FixedTextLayer("Page 1")), None);
        let text = extractor.extract(&Document::new("scan.pdf", "%PDF")).await.unwrap();
        assert_eq!(text, "Page 1");
    }

    #[tokio::test]
    async fn test_panicking_parser_is_a_pdf_error() {
        let extractor = DocumentExtractor::with_text_layer(Arc::new(PanickingTextLayer), None);
        let result = extractor.extract(&Document::new("broken.pdf", "%PDF")).await;
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[tokio::test]
    async fn test_extract_all_reports_failures_and_continues() {
        let extractor = DocumentExtractor::with_text_layer(Arc::new(FixedTextLayer(long_text())), None);
        let documents = vec![
            Document::new("a.txt", "first"),
            Document::new("model.xlsx", "PK"),
            Document::new("b.pdf", "%PDF"),
        ];

        let batch = extractor.extract_all(&documents).await;

        assert_eq!(batch.text, format!("\nfirst\n{}", long_text()));
        assert_eq!(batch.extracted, 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].file_name, "model.xlsx");
        assert_eq!(batch.failures[0].fingerprint, documents[1].fingerprint());
        assert!(batch.failures[0].reason.contains("xlsx"));
    }
}
