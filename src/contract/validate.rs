//! Raw model output → validated [`DiagnosisResult`].
//!
//! Validation is explicit: every way the text can fail the contract has a
//! [`ContractViolation`] variant, and the caller decides what to substitute.

use super::schema::{
    ContractSchema, LabelShape, StepShape, CONFIDENCE_KEY, EXPLANATION_KEY, NEXT_STEPS_KEY,
    STATUS_KEY, VISUAL_LABELS_KEY,
};
use super::{Confidence, DiagnosisResult, NextStep, Severity, VisualLabel};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Why a raw response could not be turned into a [`DiagnosisResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("response was empty")]
    Empty,
    #[error("response is not valid JSON: {0}")]
    Syntax(String),
    #[error("response is JSON but not an object")]
    NotAnObject,
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("field '{0}' must be a string")]
    NotAString(&'static str),
    #[error("field '{field}' has unknown value '{value}'")]
    UnknownValue { field: &'static str, value: String },
    #[error("field '{0}' must be a list")]
    NotAList(&'static str),
    #[error("item {index} of '{field}' is malformed")]
    BadItem { field: &'static str, index: usize },
}

/// Strip a surrounding markdown code fence (```json … ```), if any.
///
/// Models asked for bare JSON still wrap it in a fence now and then.
pub fn strip_code_fences(raw: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*```[A-Za-z]*\s*(.*?)\s*```\s*\z").expect("fence regex")
    });
    match fence.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// Validate raw model text against `schema`.
///
/// Absent or null `next_steps` / `visual_labels` are healed to empty lists.
/// Every other deviation is a [`ContractViolation`].
pub fn validate(
    raw: &str,
    schema: &ContractSchema,
) -> Result<DiagnosisResult, ContractViolation> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(ContractViolation::Empty);
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| ContractViolation::Syntax(e.to_string()))?;
    let obj = value.as_object().ok_or(ContractViolation::NotAnObject)?;

    let status_raw = required_str(obj, STATUS_KEY)?;
    let status = schema
        .parse_status(status_raw)
        .ok_or_else(|| ContractViolation::UnknownValue {
            field: STATUS_KEY,
            value: status_raw.to_string(),
        })?;

    let tag = match schema.tag_key {
        Some(key) => Some(optional_str(obj, key)?.unwrap_or("unknown").to_string()),
        None => None,
    };

    let summary = required_str(obj, schema.summary_key)?.to_string();
    let explanation = required_str(obj, EXPLANATION_KEY)?.to_string();

    let confidence_raw = required_str(obj, CONFIDENCE_KEY)?;
    let confidence = Confidence::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(confidence_raw.trim()))
        .ok_or_else(|| ContractViolation::UnknownValue {
            field: CONFIDENCE_KEY,
            value: confidence_raw.to_string(),
        })?;

    let next_steps = optional_list(obj, NEXT_STEPS_KEY)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_step(item, schema.step_shape).ok_or(ContractViolation::BadItem {
                field: NEXT_STEPS_KEY,
                index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let visual_labels = optional_list(obj, VISUAL_LABELS_KEY)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_label(item, schema.label_shape).ok_or(ContractViolation::BadItem {
                field: VISUAL_LABELS_KEY,
                index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DiagnosisResult {
        status,
        tag,
        summary,
        explanation,
        next_steps,
        confidence,
        visual_labels,
    })
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ContractViolation> {
    optional_str(obj, key)?.ok_or(ContractViolation::MissingField(key))
}

fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Option<&'a str>, ContractViolation> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ContractViolation::NotAString(key)),
    }
}

fn optional_list<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a [Value], ContractViolation> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ContractViolation::NotAList(key)),
    }
}

fn parse_step(item: &Value, shape: StepShape) -> Option<NextStep> {
    match shape {
        StepShape::Plain => item.as_str().map(|s| NextStep::Plain(s.to_string())),
        StepShape::ActionPair => {
            let obj = item.as_object()?;
            Some(NextStep::Action {
                action: obj.get("action")?.as_str()?.to_string(),
                expected_result: obj.get("expected_result")?.as_str()?.to_string(),
            })
        }
    }
}

fn parse_label(item: &Value, shape: LabelShape) -> Option<VisualLabel> {
    match (shape, item) {
        (_, Value::String(label)) => Some(VisualLabel::plain(label.clone())),
        (LabelShape::WithSeverity, Value::Object(obj)) => {
            let label = obj.get("label")?.as_str()?.to_string();
            let raw = obj.get("severity")?.as_str()?;
            let severity = Severity::ALL
                .into_iter()
                .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))?;
            Some(VisualLabel {
                label,
                severity: Some(severity),
            })
        }
        _ => None,
    }
}
