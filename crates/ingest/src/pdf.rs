use crate::ExtractionError;

/// Reads the embedded text layer of a PDF. Synchronous; callers run it on
/// the blocking pool.
pub trait PdfTextLayer: Send + Sync + 'static {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Text layer extraction with the pdf-extract crate.
pub struct PdfTextExtractor;

impl PdfTextLayer for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        pdf_extract::extract_text_from_mem(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }
}
