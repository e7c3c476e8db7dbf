//! WhatNext — paste an error or drop a screenshot, get a status and the next
//! steps to take.
//!
//! The reasoning is done by a hosted model; this crate owns the contract
//! around it. Modules:
//!   - request.rs  — evidence collection + prompt composition
//!   - llm/        — the reasoning call (Groq, Anthropic, Gemini)
//!   - contract/   — variant schemas, validation, fallback records
//!   - pipeline.rs — OCR → request → call → validated diagnosis
//!   - ocr/        — pluggable screen-text extraction
//!   - upload.rs   — PNG/JPEG decoding to RGB
//!   - annotate.rs — stacked label boxes on the screenshot
//!   - report.rs   — terminal / JSON rendering
//!   - feedback.rs — yes/partial/no feedback log
//!   - config.rs   — startup configuration

pub mod annotate;
pub mod config;
pub mod contract;
pub mod feedback;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod request;
pub mod upload;

pub use config::Config;
pub use contract::{DiagnosisResult, Variant};
pub use pipeline::{diagnose, Diagnosis, Origin};
pub use request::DiagnosisRequest;
