//! OCR domain — pluggable screen-text extraction.
//!
//! The pipeline only depends on [`TextExtractor`]. Failures never block a
//! diagnosis: [`extract_screen_text`] turns every error into "no screen text".

mod tesseract;

pub use tesseract::TesseractOcr;

use image::RgbImage;
use std::future::Future;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR is disabled")]
    Disabled,
    #[error("OCR binary '{cmd}' not found: {source}")]
    NotFound { cmd: String, source: which::Error },
    #[error("failed to encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("OCR process failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR process exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Extracted text with metadata.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub text: String,
    pub char_count: usize,
    pub latency_ms: u128,
}

pub trait TextExtractor {
    fn name(&self) -> &str;

    fn recognize(&self, image: &RgbImage) -> impl Future<Output = Result<OcrOutput, OcrError>>;
}

/// The OCR engine chosen at startup.
#[derive(Debug)]
pub enum OcrEngine {
    Tesseract(TesseractOcr),
    Disabled,
}

impl OcrEngine {
    /// Use tesseract when the binary can be found, otherwise run without OCR.
    pub fn detect(cmd: &str) -> Self {
        match TesseractOcr::locate(cmd) {
            Ok(engine) => {
                log::info!("[OCR] Using {}", engine.binary().display());
                OcrEngine::Tesseract(engine)
            }
            Err(e) => {
                log::warn!("[OCR] {} — screenshots will not be read", e);
                OcrEngine::Disabled
            }
        }
    }
}

impl TextExtractor for OcrEngine {
    fn name(&self) -> &str {
        match self {
            OcrEngine::Tesseract(_) => "tesseract",
            OcrEngine::Disabled => "disabled",
        }
    }

    async fn recognize(&self, image: &RgbImage) -> Result<OcrOutput, OcrError> {
        match self {
            OcrEngine::Tesseract(engine) => engine.recognize(image).await,
            OcrEngine::Disabled => Err(OcrError::Disabled),
        }
    }
}

/// Run OCR and keep the text only if it has non-whitespace content.
///
/// Errors are logged and reported as `None`.
pub async fn extract_screen_text<E: TextExtractor>(
    extractor: &E,
    image: &RgbImage,
) -> Option<String> {
    match extractor.recognize(image).await {
        Ok(output) => {
            log::info!(
                "[OCR] {} extracted {} chars in {}ms",
                extractor.name(),
                output.char_count,
                output.latency_ms
            );
            let text = output.text.trim();
            if text.is_empty() {
                log::info!("[OCR] No readable text on screenshot");
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(OcrError::Disabled) => None,
        Err(e) => {
            log::warn!("[OCR] {} failed: {}", extractor.name(), e);
            None
        }
    }
}
