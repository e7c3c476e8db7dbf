//! Tesseract OCR via its command-line binary.
//!
//! The image is piped in as PNG (`tesseract stdin stdout`), so nothing is
//! written to disk.

use super::{OcrError, OcrOutput};
use crate::upload::encode_png;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
}

impl TesseractOcr {
    /// Resolve `cmd` (a name on PATH or a path) to an executable.
    pub fn locate(cmd: &str) -> Result<Self, OcrError> {
        let binary = which::which(cmd).map_err(|source| OcrError::NotFound {
            cmd: cmd.to_string(),
            source,
        })?;
        Ok(Self { binary })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub async fn recognize(&self, image: &RgbImage) -> Result<OcrOutput, OcrError> {
        let start = std::time::Instant::now();
        let png_bytes = encode_png(image)?;

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png_bytes).await?;
            // Dropping stdin closes the pipe so tesseract sees EOF.
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(OcrOutput {
            char_count: text.chars().count(),
            text,
            latency_ms: start.elapsed().as_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_not_found() {
        let err = TesseractOcr::locate("whatnext-no-such-ocr-binary").unwrap_err();
        assert!(matches!(err, OcrError::NotFound { .. }));
    }
}
