pub mod document;
pub mod error;
pub mod extractor;
pub mod ocr;
pub mod pdf;

pub use document::{Document, DocumentKind, ExtractionFailure, fingerprint};
pub use error::ExtractionError;
pub use extractor::{DocumentExtractor, ExtractionBatch, MIN_TEXT_LAYER_CHARS};
pub use ocr::{OcrEngine, TesseractCli};
pub use pdf::{PdfTextExtractor, PdfTextLayer};
