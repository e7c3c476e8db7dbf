//! Fixed fallback records.
//!
//! Both constructors return a complete record with exactly one next step,
//! shaped for the variant (plain string or action pair).

use super::schema::{ContractSchema, FallbackText, StepShape};
use super::{Confidence, DiagnosisResult, NextStep, Status};

/// Returned without calling the model when neither log text nor screen text
/// was supplied.
pub fn empty_input(schema: &ContractSchema) -> DiagnosisResult {
    build(schema, &schema.empty_input, Status::Working, Confidence::High)
}

/// Returned whenever the model's output cannot be trusted: transport errors,
/// missing credentials, malformed or incomplete JSON.
pub fn parse_failure(schema: &ContractSchema) -> DiagnosisResult {
    build(schema, &schema.parse_failure, Status::Error, Confidence::Low)
}

fn build(
    schema: &ContractSchema,
    text: &FallbackText,
    status: Status,
    confidence: Confidence,
) -> DiagnosisResult {
    let step = match schema.step_shape {
        StepShape::Plain => NextStep::Plain(text.step.to_string()),
        StepShape::ActionPair => NextStep::Action {
            action: text.step.to_string(),
            expected_result: text.expected.to_string(),
        },
    };
    DiagnosisResult {
        status,
        tag: schema.tag_key.map(|_| "unknown".to_string()),
        summary: text.summary.to_string(),
        explanation: text.explanation.to_string(),
        next_steps: vec![step],
        confidence,
        visual_labels: Vec::new(),
    }
}
