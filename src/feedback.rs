//! Feedback log — the user's yes / partial / no verdict on a diagnosis.
//!
//! Records are appended as JSON lines and never read back by the pipeline.

use crate::contract::{ContractSchema, DiagnosisResult};
use crate::request::DiagnosisRequest;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("variant '{0}' does not collect feedback")]
    NotCollected(String),
    #[error("failed to write feedback log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize feedback: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    Yes,
    Partial,
    No,
}

impl FromStr for Judgment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Judgment::Yes),
            "partial" | "partially" => Ok(Judgment::Partial),
            "no" => Ok(Judgment::No),
            other => Err(format!("Invalid feedback '{}'. Use yes, partial or no.", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp_ms: u64,
    pub evidence_digest: String,
    pub log_text: Option<String>,
    pub screen_text: Option<String>,
    pub result: serde_json::Value,
    pub judgment: Judgment,
}

impl FeedbackRecord {
    pub fn new(
        schema: &ContractSchema,
        request: &DiagnosisRequest,
        result: &DiagnosisResult,
        judgment: Judgment,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            timestamp_ms,
            evidence_digest: request.evidence_digest(),
            log_text: request.log_section().map(str::to_string),
            screen_text: request.screen_section().map(str::to_string),
            result: result.to_wire(schema),
            judgment,
        }
    }
}

pub const FEEDBACK_QUESTION: &str = "Did this help? [yes/partial/no, Enter to skip]: ";

/// Ask for a verdict on a diagnosis the user has just read.
///
/// Re-asks on unrecognised answers. A blank line or end of input skips.
pub fn prompt_judgment<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> std::io::Result<Option<Judgment>> {
    loop {
        write!(output, "{}", FEEDBACK_QUESTION)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 || line.trim().is_empty() {
            return Ok(None);
        }
        match line.parse::<Judgment>() {
            Ok(judgment) => return Ok(Some(judgment)),
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

/// Append one record to the log at `path`, creating parent directories.
pub fn append(
    path: &Path,
    schema: &ContractSchema,
    record: &FeedbackRecord,
) -> Result<(), FeedbackError> {
    if !schema.collects_feedback {
        return Err(FeedbackError::NotCollected(schema.variant.to_string()));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let line = serde_json::to_string(record)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}", line)?;
    log::info!(
        "[FEEDBACK] Recorded '{:?}' for {} in {}",
        record.judgment,
        &record.evidence_digest[..15],
        path.display()
    );
    Ok(())
}
