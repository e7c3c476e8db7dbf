//! Diagnosis contract — the shape every variant's response is validated into.
//!
//! The hosted model returns JSON whose keys and spellings differ per variant.
//! Validation maps all of them onto [`DiagnosisResult`], so the presentation
//! layer only ever sees one type and never branches on field absence.
//!
//! - schema.rs   — per-variant descriptors (keys, spellings, prompts, fallbacks)
//! - validate.rs — raw text → `Result<DiagnosisResult, ContractViolation>`
//! - fallback.rs — the two fixed fallback records

pub mod fallback;
pub mod schema;
pub mod validate;

pub use schema::{ContractSchema, LabelShape, StepShape, Variant};
pub use validate::{validate, ContractViolation};

use serde::{Deserialize, Serialize};

/// Overall state of the program the evidence came from.
///
/// `Working` doubles as the neutral value used when no evidence was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Working,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Three-level tag on a visual label. Only used to pick a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One piece of guidance. Variants either return plain strings or
/// action / expected-result pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextStep {
    Plain(String),
    Action {
        action: String,
        expected_result: String,
    },
}

impl NextStep {
    /// Single-line rendering used by reports.
    pub fn display_line(&self) -> String {
        match self {
            NextStep::Plain(text) => text.clone(),
            NextStep::Action {
                action,
                expected_result,
            } => format!("{} → {}", action, expected_result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualLabel {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl VisualLabel {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            severity: None,
        }
    }
}

/// A validated diagnosis. Built either by [`validate`] or by one of the
/// constructors in [`fallback`]; never partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub status: Status,
    /// Language or domain tag. `None` for variants without a tag field.
    pub tag: Option<String>,
    pub summary: String,
    pub explanation: String,
    pub next_steps: Vec<NextStep>,
    pub confidence: Confidence,
    pub visual_labels: Vec<VisualLabel>,
}

impl DiagnosisResult {
    /// Serialize back into the variant's wire shape.
    ///
    /// A schema-conforming response fed through [`validate`] and then through
    /// this function yields the same JSON value.
    pub fn to_wire(&self, schema: &ContractSchema) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            schema::STATUS_KEY.to_string(),
            schema.status_spelling(self.status).into(),
        );
        if let Some(tag_key) = schema.tag_key {
            let tag = self.tag.clone().unwrap_or_else(|| "unknown".to_string());
            obj.insert(tag_key.to_string(), tag.into());
        }
        obj.insert(schema.summary_key.to_string(), self.summary.clone().into());
        obj.insert(
            schema::EXPLANATION_KEY.to_string(),
            self.explanation.clone().into(),
        );
        let steps = self
            .next_steps
            .iter()
            .map(|step| match step {
                NextStep::Plain(text) => serde_json::Value::String(text.clone()),
                NextStep::Action {
                    action,
                    expected_result,
                } => serde_json::json!({
                    "action": action,
                    "expected_result": expected_result,
                }),
            })
            .collect();
        obj.insert(
            schema::NEXT_STEPS_KEY.to_string(),
            serde_json::Value::Array(steps),
        );
        obj.insert(
            schema::CONFIDENCE_KEY.to_string(),
            self.confidence.as_str().into(),
        );
        let labels = self
            .visual_labels
            .iter()
            .map(|label| match (schema.label_shape, label.severity) {
                (LabelShape::WithSeverity, Some(sev)) => serde_json::json!({
                    "label": label.label,
                    "severity": sev.as_str(),
                }),
                _ => serde_json::Value::String(label.label.clone()),
            })
            .collect();
        obj.insert(
            schema::VISUAL_LABELS_KEY.to_string(),
            serde_json::Value::Array(labels),
        );
        serde_json::Value::Object(obj)
    }
}
