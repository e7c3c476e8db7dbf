//! Diagnosis pipeline — evidence → (OCR) → reasoning call → validated result.
//!
//! Every path ends in a complete [`DiagnosisResult`]:
//! - no evidence            → empty-input fallback, model never called
//! - transport/service error → parse-failure fallback
//! - contract violation      → parse-failure fallback
//! - valid response          → parsed result, optional lists healed

use crate::contract::{fallback, validate, ContractSchema, ContractViolation, DiagnosisResult};
use crate::llm::{CompletionRequest, LlmError, ReasoningService};
use crate::ocr::{self, TextExtractor};
use crate::request::{Composed, DiagnosisRequest};
use crate::upload::Screenshot;
use serde::Serialize;

/// How a result came to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Origin {
    Parsed,
    EmptyInput,
    ParseFailure(String),
}

/// A finished diagnosis: the result plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub result: DiagnosisResult,
    pub origin: Origin,
}

impl Diagnosis {
    pub fn empty_input(schema: &ContractSchema) -> Self {
        Self {
            result: fallback::empty_input(schema),
            origin: Origin::EmptyInput,
        }
    }

    pub fn parse_failure(schema: &ContractSchema, reason: impl Into<String>) -> Self {
        Self {
            result: fallback::parse_failure(schema),
            origin: Origin::ParseFailure(reason.into()),
        }
    }

    /// Turn the outcome of the reasoning call into a diagnosis. Total: every
    /// input yields either a parsed result or the parse-failure fallback.
    pub fn from_response(schema: &ContractSchema, response: Result<String, LlmError>) -> Self {
        let raw = match response {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("[PIPELINE] Reasoning call failed: {}", e);
                return Self::parse_failure(schema, e.to_string());
            }
        };
        match validate(&raw, schema) {
            Ok(result) => {
                log::info!(
                    "[CONTRACT] Parsed status={:?} confidence={:?} steps={} labels={}",
                    result.status,
                    result.confidence,
                    result.next_steps.len(),
                    result.visual_labels.len()
                );
                Self {
                    result,
                    origin: Origin::Parsed,
                }
            }
            Err(violation) => {
                log_violation(&violation, &raw);
                Self::parse_failure(schema, violation.to_string())
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self.origin, Origin::Parsed)
    }
}

fn log_violation(violation: &ContractViolation, raw: &str) {
    let preview: String = raw.chars().take(200).collect();
    log::warn!("[CONTRACT] {} — raw: {}", violation, preview);
}

/// Diagnose an already-assembled request.
pub async fn diagnose<S: ReasoningService>(
    service: &S,
    schema: &ContractSchema,
    request: &DiagnosisRequest,
) -> Diagnosis {
    let evidence = match request.compose() {
        Composed::NoEvidence => {
            log::info!("[PIPELINE] No evidence supplied — skipping reasoning call");
            return Diagnosis::empty_input(schema);
        }
        Composed::Prompt(evidence) => evidence,
    };

    log::info!(
        "[PIPELINE] variant={} provider={} evidence={} chars ({})",
        schema.variant,
        service.name(),
        evidence.len(),
        &request.evidence_digest()[..15]
    );

    let completion = CompletionRequest {
        instructions: schema.system_prompt,
        evidence: &evidence,
        max_tokens: schema.max_tokens,
    };
    let start = std::time::Instant::now();
    let response = service.complete(&completion).await;
    log::info!(
        "[PIPELINE] Reasoning call finished in {}ms",
        start.elapsed().as_millis()
    );

    Diagnosis::from_response(schema, response)
}

/// Full action: OCR the screenshot (if any), build the request, diagnose.
///
/// Returns the request too, so callers can record feedback against it.
pub async fn run<S, E>(
    service: &S,
    extractor: &E,
    schema: &ContractSchema,
    log_text: Option<String>,
    screenshot: Option<&Screenshot>,
) -> (DiagnosisRequest, Diagnosis)
where
    S: ReasoningService,
    E: TextExtractor,
{
    let screen_text = match screenshot {
        Some(shot) => ocr::extract_screen_text(extractor, &shot.image).await,
        None => None,
    };
    let request = DiagnosisRequest::new(log_text, screen_text, screenshot.is_some());
    let diagnosis = diagnose(service, schema, &request).await;
    (request, diagnosis)
}
