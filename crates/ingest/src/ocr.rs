use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::ExtractionError;

/// Upper bound for a single rasterizer or OCR process.
const PROCESS_TIMEOUT: Duration = Duration::from_secs(120);

#[async_trait]
pub trait OcrEngine: Send + Sync + 'static {
    /// OCR every page of a PDF, returning the page texts concatenated in order.
    async fn ocr_pdf(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// OCR through the poppler `pdftoppm` and `tesseract` command-line tools.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    pub pdftoppm_path: PathBuf,
    pub tesseract_path: PathBuf,
    pub dpi: u32,
    pub lang: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            pdftoppm_path: PathBuf::from("pdftoppm"),
            tesseract_path: PathBuf::from("tesseract"),
            dpi: 300,
            lang: "eng".to_string(),
        }
    }
}

impl TesseractCli {
    async fn rasterize(&self, pdf: &Path, out_prefix: &Path) -> Result<(), ExtractionError> {
        let output = run(
            Command::new(&self.pdftoppm_path)
                .arg("-r")
                .arg(self.dpi.to_string())
                .arg("-png")
                .arg(pdf)
                .arg(out_prefix),
            "pdftoppm",
        )
        .await?;

        if !output.status.success() {
            return Err(ExtractionError::Ocr(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn ocr_image(&self, image: &Path) -> Result<String, ExtractionError> {
        let output = run(
            Command::new(&self.tesseract_path)
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.lang),
            "tesseract",
        )
        .await?;

        if !output.status.success() {
            return Err(ExtractionError::Ocr(format!(
                "tesseract failed on {}: {}",
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn ocr_pdf(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let workdir = tempfile::TempDir::new()?;
        let pdf_path = workdir.path().join("input.pdf");
        tokio::fs::write(&pdf_path, pdf_bytes).await?;

        self.rasterize(&pdf_path, &workdir.path().join("page")).await?;

        // pdftoppm zero-pads page numbers, so name order is page order.
        let mut pages = Vec::new();
        let mut entries = tokio::fs::read_dir(workdir.path()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                pages.push(path);
            }
        }
        pages.sort();

        if pages.is_empty() {
            return Err(ExtractionError::Ocr("pdftoppm produced no pages".to_string()));
        }

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.ocr_image(page).await?);
        }

        tracing::debug!(pages = pages.len(), chars = text.len(), "OCR complete");

        Ok(text)
    }
}

async fn run(command: &mut Command, program: &str) -> Result<Output, ExtractionError> {
    timeout(PROCESS_TIMEOUT, command.kill_on_drop(true).output())
        .await
        .map_err(|_| ExtractionError::Ocr(format!("{} timed out", program)))?
        .map_err(|e| ExtractionError::Ocr(format!("failed to run {}: {}", program, e)))
}
