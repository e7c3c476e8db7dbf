//! Per-variant schema descriptors.
//!
//! All six variants share one contract; a `ContractSchema` captures what
//! differs between them: key names, status spellings, item shapes, the
//! instruction template, the token ceiling, and the fallback wording.

use super::Status;
use crate::llm::prompts;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const STATUS_KEY: &str = "status";
pub const EXPLANATION_KEY: &str = "explanation";
pub const NEXT_STEPS_KEY: &str = "next_steps";
pub const CONFIDENCE_KEY: &str = "confidence";
pub const VISUAL_LABELS_KEY: &str = "visual_labels";

/// Shape of each `next_steps` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepShape {
    /// `["step 1", "step 2"]`
    Plain,
    /// `[{"action": "...", "expected_result": "..."}]`
    ActionPair,
}

/// Shape of each `visual_labels` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelShape {
    /// `["label"]`
    Plain,
    /// `[{"label": "...", "severity": "info|warning|error"}]`; bare strings are accepted too.
    WithSeverity,
}

/// Fixed wording of one fallback record.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FallbackText {
    pub summary: &'static str,
    pub explanation: &'static str,
    pub step: &'static str,
    /// Expected result shown next to `step` for action-pair variants.
    pub expected: &'static str,
}

/// Everything that varies between diagnosis variants.
#[derive(Debug, Clone, Serialize)]
pub struct ContractSchema {
    pub variant: Variant,
    pub title: &'static str,
    #[serde(skip)]
    pub system_prompt: &'static str,
    pub max_tokens: u32,
    /// Wire spelling for Working, Warning, Error, in that order.
    pub status_spellings: [&'static str; 3],
    pub tag_key: Option<&'static str>,
    pub summary_key: &'static str,
    pub step_shape: StepShape,
    pub label_shape: LabelShape,
    pub collects_feedback: bool,
    pub empty_input: FallbackText,
    pub parse_failure: FallbackText,
}

impl ContractSchema {
    pub fn status_spelling(&self, status: Status) -> &'static str {
        match status {
            Status::Working => self.status_spellings[0],
            Status::Warning => self.status_spellings[1],
            Status::Error => self.status_spellings[2],
        }
    }

    /// Map a wire status back to [`Status`]. Case and surrounding whitespace
    /// are ignored; anything else unknown is rejected.
    pub fn parse_status(&self, raw: &str) -> Option<Status> {
        let raw = raw.trim();
        [Status::Working, Status::Warning, Status::Error]
            .into_iter()
            .find(|s| self.status_spelling(*s).eq_ignore_ascii_case(raw))
    }
}

/// The six shipped variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    WhatNext,
    Explainer,
    StepGuide,
    ScreenDoc,
    QuickCheck,
    Feedback,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::WhatNext,
        Variant::Explainer,
        Variant::StepGuide,
        Variant::ScreenDoc,
        Variant::QuickCheck,
        Variant::Feedback,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Variant::WhatNext => "whatnext",
            Variant::Explainer => "explainer",
            Variant::StepGuide => "stepguide",
            Variant::ScreenDoc => "screendoc",
            Variant::QuickCheck => "quickcheck",
            Variant::Feedback => "feedback",
        }
    }

    pub fn schema(self) -> &'static ContractSchema {
        match self {
            Variant::WhatNext => &WHATNEXT,
            Variant::Explainer => &EXPLAINER,
            Variant::StepGuide => &STEPGUIDE,
            Variant::ScreenDoc => &SCREENDOC,
            Variant::QuickCheck => &QUICKCHECK,
            Variant::Feedback => &FEEDBACK,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Variant::ALL
            .into_iter()
            .find(|v| v.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Variant::ALL.iter().map(|v| v.id()).collect();
                format!("Unknown variant '{}'. Use one of: {}", s, known.join(", "))
            })
    }
}

// ── Fallback wording ─────────────────────────────────────────────────

const EMPTY_INPUT: FallbackText = FallbackText {
    summary: "No error provided",
    explanation: "No logs or errors were shared.",
    step: "Paste the error or output you want checked, or upload a screenshot.",
    expected: "A diagnosis based on the evidence you supplied.",
};

const PARSE_FAILURE: FallbackText = FallbackText {
    summary: "Unclear or malformed error",
    explanation: "The error output could not be reliably interpreted.",
    step: "Retry with only the relevant error lines.",
    expected: "A clearer diagnosis from narrower evidence.",
};

const SCREEN_EMPTY_INPUT: FallbackText = FallbackText {
    summary: "Nothing to inspect",
    explanation: "No log text was pasted and no readable text was found on the screenshot.",
    step: "Paste the log output or upload a screenshot with the error visible.",
    expected: "The screen or log is analyzed for problems.",
};

const SCREEN_PARSE_FAILURE: FallbackText = FallbackText {
    summary: "Diagnosis unavailable",
    explanation: "The evidence could not be reliably interpreted.",
    step: "Retry with a tighter screenshot or only the failing log lines.",
    expected: "A diagnosis the assistant can stand behind.",
};

// ── Descriptors ──────────────────────────────────────────────────────

const UPPER: [&str; 3] = ["WORKING", "WARNING", "ERROR"];

static WHATNEXT: ContractSchema = ContractSchema {
    variant: Variant::WhatNext,
    title: "Visual WhatNext",
    system_prompt: prompts::WHATNEXT_SYSTEM_PROMPT,
    max_tokens: 500,
    status_spellings: UPPER,
    tag_key: Some("language"),
    summary_key: "error_summary",
    step_shape: StepShape::Plain,
    label_shape: LabelShape::Plain,
    collects_feedback: false,
    empty_input: EMPTY_INPUT,
    parse_failure: PARSE_FAILURE,
};

static EXPLAINER: ContractSchema = ContractSchema {
    variant: Variant::Explainer,
    title: "Error Explainer",
    system_prompt: prompts::EXPLAINER_SYSTEM_PROMPT,
    max_tokens: 600,
    status_spellings: UPPER,
    tag_key: Some("language"),
    summary_key: "summary",
    step_shape: StepShape::Plain,
    label_shape: LabelShape::WithSeverity,
    collects_feedback: false,
    empty_input: EMPTY_INPUT,
    parse_failure: PARSE_FAILURE,
};

static STEPGUIDE: ContractSchema = ContractSchema {
    variant: Variant::StepGuide,
    title: "Step Guide",
    system_prompt: prompts::STEPGUIDE_SYSTEM_PROMPT,
    max_tokens: 600,
    status_spellings: UPPER,
    tag_key: Some("language"),
    summary_key: "summary",
    step_shape: StepShape::ActionPair,
    label_shape: LabelShape::Plain,
    collects_feedback: false,
    empty_input: EMPTY_INPUT,
    parse_failure: PARSE_FAILURE,
};

static SCREENDOC: ContractSchema = ContractSchema {
    variant: Variant::ScreenDoc,
    title: "Screen Doctor",
    system_prompt: prompts::SCREENDOC_SYSTEM_PROMPT,
    max_tokens: 700,
    status_spellings: ["working", "warning", "error"],
    tag_key: Some("domain"),
    summary_key: "summary",
    step_shape: StepShape::ActionPair,
    label_shape: LabelShape::WithSeverity,
    collects_feedback: false,
    empty_input: SCREEN_EMPTY_INPUT,
    parse_failure: SCREEN_PARSE_FAILURE,
};

static QUICKCHECK: ContractSchema = ContractSchema {
    variant: Variant::QuickCheck,
    title: "Quick Check",
    system_prompt: prompts::QUICKCHECK_SYSTEM_PROMPT,
    max_tokens: 400,
    status_spellings: ["OK", "WARNING", "ERROR"],
    tag_key: None,
    summary_key: "summary",
    step_shape: StepShape::Plain,
    label_shape: LabelShape::Plain,
    collects_feedback: false,
    empty_input: EMPTY_INPUT,
    parse_failure: PARSE_FAILURE,
};

static FEEDBACK: ContractSchema = ContractSchema {
    variant: Variant::Feedback,
    title: "WhatNext with Feedback",
    system_prompt: prompts::FEEDBACK_SYSTEM_PROMPT,
    max_tokens: 700,
    status_spellings: UPPER,
    tag_key: Some("language"),
    summary_key: "summary",
    step_shape: StepShape::ActionPair,
    label_shape: LabelShape::WithSeverity,
    collects_feedback: true,
    empty_input: SCREEN_EMPTY_INPUT,
    parse_failure: SCREEN_PARSE_FAILURE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_ids_round_trip_through_from_str() {
        for v in Variant::ALL {
            assert_eq!(v.id().parse::<Variant>().unwrap(), v);
            assert_eq!(v.schema().variant, v);
        }
    }

    #[test]
    fn unknown_variant_lists_known_ids() {
        let err = "nope".parse::<Variant>().unwrap_err();
        assert!(err.contains("whatnext"));
        assert!(err.contains("feedback"));
    }

    #[test]
    fn token_ceilings_stay_in_range() {
        for v in Variant::ALL {
            let max = v.schema().max_tokens;
            assert!((400..=700).contains(&max), "{} has {}", v, max);
        }
    }

    #[test]
    fn status_parsing_ignores_case() {
        let schema = Variant::QuickCheck.schema();
        assert_eq!(schema.parse_status("ok"), Some(Status::Working));
        assert_eq!(schema.parse_status(" Error "), Some(Status::Error));
        assert_eq!(schema.parse_status("WORKING"), None);
    }

    #[test]
    fn only_variant_six_collects_feedback() {
        let collecting: Vec<Variant> = Variant::ALL
            .into_iter()
            .filter(|v| v.schema().collects_feedback)
            .collect();
        assert_eq!(collecting, vec![Variant::Feedback]);
    }
}
