//! Diagnosis request — the evidence for one user action.

use crate::llm::prompts;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Evidence gathered for one diagnosis. Created per action, used once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosisRequest {
    pub raw_log_text: Option<String>,
    pub screen_text: Option<String>,
    pub has_image: bool,
}

/// Output of the request builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composed {
    /// Neither log text nor screen text: answer locally, do not call the model.
    NoEvidence,
    /// Evidence message for the model.
    Prompt(String),
}

impl DiagnosisRequest {
    pub fn new(raw_log_text: Option<String>, screen_text: Option<String>, has_image: bool) -> Self {
        Self {
            raw_log_text,
            screen_text,
            has_image,
        }
    }

    /// Log text after trimming, `None` when absent or blank.
    pub fn log_section(&self) -> Option<&str> {
        non_blank(self.raw_log_text.as_deref())
    }

    /// Screen text after trimming, `None` when absent or blank.
    pub fn screen_section(&self) -> Option<&str> {
        non_blank(self.screen_text.as_deref())
    }

    pub fn has_evidence(&self) -> bool {
        self.log_section().is_some() || self.screen_section().is_some()
    }

    /// SHA-256 over the trimmed sections, used to refer to evidence in logs
    /// and feedback records without repeating it.
    pub fn evidence_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.log_section().unwrap_or_default().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.screen_section().unwrap_or_default().as_bytes());
        format!("sha256:{:x}", hasher.finalize())
    }

    /// Build the evidence message, or [`Composed::NoEvidence`] when there is
    /// nothing to reason about. An uploaded image alone is not evidence.
    pub fn compose(&self) -> Composed {
        if !self.has_evidence() {
            return Composed::NoEvidence;
        }
        Composed::Prompt(prompts::build_evidence_message(
            self.log_section(),
            self.screen_section(),
            self.has_image,
        ))
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::{LOG_SECTION_HEADER, SCREEN_SECTION_HEADER};

    #[test]
    fn empty_request_needs_no_call() {
        assert_eq!(DiagnosisRequest::default().compose(), Composed::NoEvidence);
    }

    #[test]
    fn whitespace_and_image_only_needs_no_call() {
        let req = DiagnosisRequest::new(Some(" \n\t".into()), Some("   ".into()), true);
        assert_eq!(req.compose(), Composed::NoEvidence);
    }

    #[test]
    fn sections_are_trimmed() {
        let req = DiagnosisRequest::new(Some("\n  KeyError: 'id'  \n".into()), None, false);
        match req.compose() {
            Composed::Prompt(p) => {
                assert!(p.contains(&format!("{}\nKeyError: 'id'\n", LOG_SECTION_HEADER)));
            }
            Composed::NoEvidence => panic!("expected a prompt"),
        }
    }

    #[test]
    fn digest_ignores_surrounding_whitespace() {
        let a = DiagnosisRequest::new(Some("boom".into()), None, false);
        let b = DiagnosisRequest::new(Some("  boom\n".into()), None, true);
        assert_eq!(a.evidence_digest(), b.evidence_digest());
        assert!(a.evidence_digest().starts_with("sha256:"));
    }

    #[test]
    fn digest_separates_log_from_screen() {
        let log = DiagnosisRequest::new(Some("boom".into()), None, false);
        let screen = DiagnosisRequest::new(None, Some("boom".into()), false);
        assert_ne!(log.evidence_digest(), screen.evidence_digest());
    }

    #[test]
    fn screen_text_alone_is_evidence() {
        let req = DiagnosisRequest::new(None, Some("Access denied".into()), true);
        match req.compose() {
            Composed::Prompt(p) => {
                assert!(p.contains(SCREEN_SECTION_HEADER));
                assert!(!p.contains(LOG_SECTION_HEADER));
            }
            Composed::NoEvidence => panic!("expected a prompt"),
        }
    }
}
