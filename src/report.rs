//! Report rendering — a diagnosis as terminal text or JSON.

use crate::contract::{ContractSchema, DiagnosisResult, Status};
use crate::pipeline::Diagnosis;
use std::fmt::Write;

pub fn status_badge(status: Status) -> &'static str {
    match status {
        Status::Working => "✅ WORKING",
        Status::Warning => "⚠️ WARNING",
        Status::Error => "❌ ERROR",
    }
}

/// Human-readable report. Empty lists render no section at all.
pub fn render_text(schema: &ContractSchema, result: &DiagnosisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_badge(result.status));
    let _ = writeln!(out);
    if let (Some(key), Some(tag)) = (schema.tag_key, result.tag.as_deref()) {
        let _ = writeln!(out, "{}: {}", capitalize(key), tag);
    }
    let _ = writeln!(out, "Confidence: {}", result.confidence.as_str());
    let _ = writeln!(out);
    let _ = writeln!(out, "Issue summary");
    let _ = writeln!(out, "  {}", result.summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "What's happening");
    let _ = writeln!(out, "  {}", result.explanation);

    if !result.next_steps.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "What to do next");
        for (i, step) in result.next_steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step.display_line());
        }
    }

    if !result.visual_labels.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Visual labels");
        for (i, label) in result.visual_labels.iter().enumerate() {
            match label.severity {
                Some(sev) => {
                    let _ = writeln!(out, "  {}. {} [{}]", i + 1, label.label, sev.as_str());
                }
                None => {
                    let _ = writeln!(out, "  {}. {}", i + 1, label.label);
                }
            }
        }
    }
    out
}

/// Machine-readable report: the result in the variant's wire shape plus
/// where it came from.
pub fn render_json(schema: &ContractSchema, diagnosis: &Diagnosis) -> serde_json::Value {
    serde_json::json!({
        "variant": schema.variant,
        "origin": diagnosis.origin,
        "result": diagnosis.result.to_wire(schema),
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
