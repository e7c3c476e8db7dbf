//! End-to-end pipeline scenarios against a scripted reasoning service.
//!
//! No network: the stub records what it was asked and replies with a fixed
//! outcome, so every fallback path can be driven deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use image::{Rgb, RgbImage};
use whatnext_lib::contract::{
    fallback, Confidence, NextStep, Severity, Status, Variant, VisualLabel,
};
use whatnext_lib::llm::prompts::{LOG_SECTION_HEADER, SCREEN_SECTION_HEADER};
use whatnext_lib::llm::{CompletionRequest, LlmError, ReasoningService};
use whatnext_lib::ocr::{OcrError, OcrOutput, TextExtractor};
use whatnext_lib::pipeline::{self, Diagnosis, Origin};
use whatnext_lib::upload::{encode_png, Screenshot};
use whatnext_lib::DiagnosisRequest;

// ── Test doubles ─────────────────────────────────────────────────────

struct Scripted {
    reply: Result<String, fn() -> LlmError>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String, u32)>>,
}

impl Scripted {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn failing(err: fn() -> LlmError) -> Self {
        Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_evidence(&self) -> String {
        self.last.lock().unwrap().as_ref().unwrap().1.clone()
    }
}

impl ReasoningService for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((
            request.instructions.to_string(),
            request.evidence.to_string(),
            request.max_tokens,
        ));
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

enum FakeOcr {
    Text(&'static str),
    Fails,
}

impl TextExtractor for FakeOcr {
    fn name(&self) -> &str {
        "fake"
    }

    async fn recognize(&self, _image: &RgbImage) -> Result<OcrOutput, OcrError> {
        match self {
            FakeOcr::Text(text) => Ok(OcrOutput {
                text: text.to_string(),
                char_count: text.chars().count(),
                latency_ms: 1,
            }),
            FakeOcr::Fails => Err(OcrError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "Error in pixReadMem".to_string(),
            }),
        }
    }
}

fn blank_screenshot() -> Screenshot {
    let img = RgbImage::from_pixel(64, 32, Rgb([255, 255, 255]));
    Screenshot::from_bytes(&encode_png(&img).unwrap()).unwrap()
}

fn log_request(text: &str) -> DiagnosisRequest {
    DiagnosisRequest::new(Some(text.to_string()), None, false)
}

const TRACEBACK: &str = r#"Traceback (most recent call last):
  File "app.py", line 1, in <module>
    import pandas
ModuleNotFoundError: No module named 'pandas'"#;

// ── Empty evidence ───────────────────────────────────────────────────

#[tokio::test]
async fn empty_evidence_never_calls_the_service() {
    let inputs = [
        DiagnosisRequest::default(),
        DiagnosisRequest::new(Some(String::new()), None, false),
        DiagnosisRequest::new(Some("  \n\t ".into()), Some(" ".into()), false),
        DiagnosisRequest::new(None, None, true),
    ];
    for variant in Variant::ALL {
        let schema = variant.schema();
        for request in &inputs {
            let service = Scripted::replying("{}");
            let d = pipeline::diagnose(&service, schema, request).await;
            assert_eq!(service.calls(), 0, "{} called the service", variant);
            assert_eq!(d, Diagnosis::empty_input(schema));
        }
    }
}

#[tokio::test]
async fn empty_input_is_neutral_with_one_instruction() {
    let schema = Variant::WhatNext.schema();
    let service = Scripted::replying("{}");
    let d = pipeline::diagnose(&service, schema, &log_request("")).await;

    assert_eq!(d.origin, Origin::EmptyInput);
    assert_eq!(d.result.status, Status::Working);
    assert_eq!(d.result.next_steps.len(), 1);
    assert!(d.result.next_steps[0].display_line().contains("Paste the error"));
}

#[tokio::test]
async fn blank_screenshot_without_log_matches_all_empty() {
    for variant in Variant::ALL {
        let schema = variant.schema();
        let shot = blank_screenshot();
        for ocr in [FakeOcr::Text("  \n\x0c"), FakeOcr::Fails] {
            let service = Scripted::replying("{}");
            let (request, d) = pipeline::run(&service, &ocr, schema, None, Some(&shot)).await;
            assert!(request.has_image);
            assert!(request.screen_text.is_none());
            assert_eq!(service.calls(), 0);
            assert_eq!(d, Diagnosis::empty_input(schema));
        }
    }
}

// ── Untrusted output ─────────────────────────────────────────────────

#[tokio::test]
async fn not_json_yields_low_confidence_fallback() {
    let schema = Variant::WhatNext.schema();
    let service = Scripted::replying("not json");
    let d = pipeline::diagnose(&service, schema, &log_request(TRACEBACK)).await;

    assert_eq!(service.calls(), 1);
    assert_eq!(d.result, fallback::parse_failure(schema));
    assert_eq!(d.result.confidence, Confidence::Low);
    assert!(matches!(d.origin, Origin::ParseFailure(_)));
}

#[tokio::test]
async fn every_unusable_response_falls_back() {
    let unusable = [
        "",
        "   ",
        "not json",
        "{",
        "[]",
        "null",
        "42",
        r#""a string""#,
        r#"{"status": "ERROR"}"#,
        r#"{"status": "ERROR", "language": "python", "error_summary": "Missing pand"#,
        r#"{"status": 3, "summary": "s", "error_summary": "s", "explanation": "e", "confidence": "low"}"#,
        r#"{"status": "ERROR", "summary": "s", "error_summary": "s", "explanation": "e", "confidence": "sure"}"#,
        r#"{"status": "ERROR", "summary": "s", "error_summary": "s", "explanation": "e", "confidence": "low", "next_steps": {"a": 1}}"#,
        r#"{"status": "ERROR", "summary": "s", "error_summary": "s", "explanation": "e", "confidence": "low", "visual_labels": "Terminal"}"#,
        r#"{"status": "ERROR", "summary": "s", "error_summary": "s", "explanation": "e", "confidence": "low", "next_steps": [1, 2]}"#,
    ];
    for variant in Variant::ALL {
        let schema = variant.schema();
        for raw in unusable {
            let service = Scripted::replying(raw);
            let d = pipeline::diagnose(&service, schema, &log_request(TRACEBACK)).await;
            assert_eq!(
                d.result,
                fallback::parse_failure(schema),
                "{} accepted {:?}",
                variant,
                raw
            );
            assert_eq!(d.result.confidence, Confidence::Low);
            assert!(!d.result.next_steps.is_empty());
        }
    }
}

#[tokio::test]
async fn transport_failures_fall_back() {
    let failures: [fn() -> LlmError; 3] = [
        || LlmError::NotConfigured("GROQ_API_KEY"),
        || LlmError::Status {
            status: 503,
            body: "overloaded".to_string(),
        },
        || LlmError::NoContent,
    ];
    let schema = Variant::Explainer.schema();
    for make in failures {
        let service = Scripted::failing(make);
        let d = pipeline::diagnose(&service, schema, &log_request(TRACEBACK)).await;
        assert_eq!(service.calls(), 1);
        assert_eq!(d.result, fallback::parse_failure(schema));
        assert!(d.is_fallback());
    }
}

// ── Successful parses ────────────────────────────────────────────────

#[tokio::test]
async fn missing_visual_labels_become_empty() {
    let schema = Variant::WhatNext.schema();
    let raw = r#"{
        "status": "ERROR",
        "language": "python",
        "error_summary": "pandas is not installed",
        "explanation": "The import fails because the package is missing.",
        "next_steps": ["pip install pandas", "Re-run the script"],
        "confidence": "high"
    }"#;
    let service = Scripted::replying(raw);
    let d = pipeline::diagnose(&service, schema, &log_request(TRACEBACK)).await;

    assert_eq!(d.origin, Origin::Parsed);
    assert!(d.result.visual_labels.is_empty());
    assert_eq!(d.result.status, Status::Error);
    assert_eq!(d.result.tag.as_deref(), Some("python"));
    assert_eq!(d.result.summary, "pandas is not installed");
    assert_eq!(
        d.result.next_steps,
        vec![
            NextStep::Plain("pip install pandas".to_string()),
            NextStep::Plain("Re-run the script".to_string()),
        ]
    );
    assert_eq!(d.result.confidence, Confidence::High);
}

#[tokio::test]
async fn missing_optional_lists_become_empty_for_every_variant() {
    for variant in Variant::ALL {
        let schema = variant.schema();
        let mut obj = serde_json::Map::new();
        obj.insert("status".into(), schema.status_spellings[1].into());
        if let Some(tag) = schema.tag_key {
            obj.insert(tag.into(), "unknown".into());
        }
        obj.insert(schema.summary_key.into(), "Deprecation warning".into());
        obj.insert("explanation".into(), "Still runs.".into());
        obj.insert("confidence".into(), "medium".into());
        let raw = serde_json::Value::Object(obj).to_string();

        let service = Scripted::replying(&raw);
        let d = pipeline::diagnose(&service, schema, &log_request("DeprecationWarning")).await;
        assert_eq!(d.origin, Origin::Parsed, "{}", variant);
        assert_eq!(d.result.status, Status::Warning);
        assert!(d.result.next_steps.is_empty());
        assert!(d.result.visual_labels.is_empty());
    }
}

fn conforming_response(variant: Variant) -> serde_json::Value {
    let schema = variant.schema();
    let steps = match schema.step_shape {
        whatnext_lib::contract::StepShape::Plain => serde_json::json!(["Restart the server"]),
        whatnext_lib::contract::StepShape::ActionPair => serde_json::json!([
            {"action": "Restart the server", "expected_result": "Port 8080 accepts connections"}
        ]),
    };
    let labels = match schema.label_shape {
        whatnext_lib::contract::LabelShape::Plain => serde_json::json!(["Terminal", "Port number"]),
        whatnext_lib::contract::LabelShape::WithSeverity => serde_json::json!([
            {"label": "Terminal", "severity": "info"},
            {"label": "Port number", "severity": "error"}
        ]),
    };
    let mut obj = serde_json::Map::new();
    obj.insert("status".into(), schema.status_spellings[2].into());
    if let Some(tag) = schema.tag_key {
        obj.insert(tag.into(), "runtime".into());
    }
    obj.insert(schema.summary_key.into(), "Port already in use".into());
    obj.insert("explanation".into(), "Another process holds port 8080.".into());
    obj.insert("next_steps".into(), steps);
    obj.insert("confidence".into(), "medium".into());
    obj.insert("visual_labels".into(), labels);
    serde_json::Value::Object(obj)
}

#[tokio::test]
async fn conforming_json_round_trips_field_for_field() {
    for variant in Variant::ALL {
        let schema = variant.schema();
        let expected = conforming_response(variant);
        let service = Scripted::replying(&expected.to_string());
        let d = pipeline::diagnose(&service, schema, &log_request("EADDRINUSE :8080")).await;

        assert_eq!(d.origin, Origin::Parsed, "{}", variant);
        assert_eq!(d.result.to_wire(schema), expected, "{}", variant);
    }
}

#[tokio::test]
async fn fenced_json_is_accepted() {
    let schema = Variant::ScreenDoc.schema();
    let body = conforming_response(Variant::ScreenDoc);
    let fenced = format!("```json\n{}\n```", serde_json::to_string_pretty(&body).unwrap());
    let service = Scripted::replying(&fenced);
    let d = pipeline::diagnose(&service, schema, &log_request("EADDRINUSE")).await;

    assert_eq!(d.origin, Origin::Parsed);
    assert_eq!(
        d.result.visual_labels[1],
        VisualLabel {
            label: "Port number".to_string(),
            severity: Some(Severity::Error),
        }
    );
}

// ── What the service is asked ────────────────────────────────────────

#[tokio::test]
async fn service_receives_variant_instructions_and_ceiling() {
    for variant in Variant::ALL {
        let schema = variant.schema();
        let service = Scripted::replying("not json");
        pipeline::diagnose(&service, schema, &log_request(TRACEBACK)).await;

        let (instructions, _, max_tokens) = service.last.lock().unwrap().clone().unwrap();
        assert_eq!(instructions, schema.system_prompt);
        assert_eq!(max_tokens, schema.max_tokens);
    }
}

#[tokio::test]
async fn ocr_text_reaches_the_service_under_its_own_header() {
    let schema = Variant::ScreenDoc.schema();
    let service = Scripted::replying("not json");
    let ocr = FakeOcr::Text("Permission denied (publickey)\n");
    let shot = blank_screenshot();

    let (request, _) = pipeline::run(
        &service,
        &ocr,
        schema,
        Some("git push origin main".to_string()),
        Some(&shot),
    )
    .await;

    assert_eq!(
        request.screen_text.as_deref(),
        Some("Permission denied (publickey)")
    );
    let evidence = service.last_evidence();
    assert!(evidence.contains(&format!("{}\ngit push origin main", LOG_SECTION_HEADER)));
    assert!(evidence.contains(&format!(
        "{}\nPermission denied (publickey)",
        SCREEN_SECTION_HEADER
    )));
}

#[tokio::test]
async fn failed_ocr_still_diagnoses_log_text() {
    let schema = Variant::WhatNext.schema();
    let service = Scripted::replying("not json");
    let shot = blank_screenshot();

    let (request, d) = pipeline::run(
        &service,
        &FakeOcr::Fails,
        schema,
        Some(TRACEBACK.to_string()),
        Some(&shot),
    )
    .await;

    assert!(request.screen_text.is_none());
    assert_eq!(service.calls(), 1);
    assert!(!service.last_evidence().contains(SCREEN_SECTION_HEADER));
    assert!(d.is_fallback());
}
