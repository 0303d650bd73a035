//! Note analysis orchestration.
//!
//! # Responsibility
//! - Render the fixed extraction instruction for one note.
//! - Run extraction -> parse -> normalize -> render as one round trip.
//! - Convert every failure into the degraded [`AnalysisResult`].
//!
//! # Invariants
//! - `analyze` never returns an error and never panics on service output.
//! - Failure summaries carry at most [`FAILURE_DETAIL_MAX_CHARS`] characters
//!   of the error description.
//! - Note text is never written to logs.

use crate::extraction::{ChatMessage, ExtractionError, ExtractionRequest, ExtractionService};
use crate::logging::{sanitize_message, MAX_LOGGED_ERROR_CHARS};
use crate::model::plan::{AnalysisResult, Plan};
use crate::plan::diagram::{render_diagram, ERROR_DIAGRAM};
use crate::plan::normalize::{normalize_plan, truncate_chars, NormalizeError};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const FAILURE_SUMMARY_PREFIX: &str = "Analysis failed: ";
pub const FAILURE_DETAIL_MAX_CHARS: usize = 100;

pub const EXTRACTION_INSTRUCTION: &str = r#"You turn a personal note into an actionable plan.
Rules:
- Write a one-sentence summary of the note (at most 120 characters).
- Identify 1 to 5 goals the note implies. Give each goal an id G1, G2, ...
- Break every goal into 1 to 7 concrete tasks. Give each task an id T1, T2, ... unique across the whole plan.
- List in depends_on the ids of tasks that must be finished first. Use an empty list when there are none.
- Estimate effort in hours when the note allows it, otherwise use null.
- Write in the language of the note.
Respond with JSON only, exactly in this shape:
{"summary": string, "goals": [{"id": string, "title": string, "rationale": string, "tasks": [{"id": string, "title": string, "details": string, "depends_on": [string], "estimate_hours": number|null}]}]}"#;

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n(.*?)\n?\s*```\s*$").expect("valid code fence regex")
});

/// Internal failure of one analysis round trip.
#[derive(Debug)]
pub enum AnalyzeError {
    Extraction(ExtractionError),
    InvalidJson(serde_json::Error),
    Normalize(NormalizeError),
}

impl Display for AnalyzeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extraction(err) => write!(f, "{err}"),
            Self::InvalidJson(err) => write!(f, "extraction output is not valid JSON: {err}"),
            Self::Normalize(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AnalyzeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Extraction(err) => Some(err),
            Self::InvalidJson(err) => Some(err),
            Self::Normalize(err) => Some(err),
        }
    }
}

impl From<ExtractionError> for AnalyzeError {
    fn from(value: ExtractionError) -> Self {
        Self::Extraction(value)
    }
}

impl From<serde_json::Error> for AnalyzeError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

impl From<NormalizeError> for AnalyzeError {
    fn from(value: NormalizeError) -> Self {
        Self::Normalize(value)
    }
}

/// Tagged outcome of the extraction stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Extracted(Plan),
    Failed(String),
}

impl ExtractionOutcome {
    /// Renders the caller-visible result; `Failed` becomes the degraded shape.
    pub fn into_result(self) -> AnalysisResult {
        match self {
            Self::Extracted(plan) => {
                let diagram = render_diagram(&plan);
                AnalysisResult {
                    summary: plan.summary,
                    goals: plan.goals,
                    diagram,
                }
            }
            Self::Failed(reason) => failure_result(&reason),
        }
    }
}

/// Note-to-plan orchestrator over an extraction service.
pub struct PlanExtractor<S: ExtractionService> {
    service: S,
}

impl<S: ExtractionService> PlanExtractor<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Runs one analysis round trip; failures are encoded in the result.
    pub fn analyze(&self, title: &str, content: &str) -> AnalysisResult {
        self.extract_plan(title, content).into_result()
    }

    /// Runs extraction and normalization, returning a tagged outcome.
    pub fn extract_plan(&self, title: &str, content: &str) -> ExtractionOutcome {
        let started_at = Instant::now();
        match self.try_extract(title, content) {
            Ok(plan) => {
                info!(
                    "event=plan_analyze module=plan status=ok goals={} tasks={} duration_ms={}",
                    plan.goals.len(),
                    plan.task_count(),
                    started_at.elapsed().as_millis()
                );
                ExtractionOutcome::Extracted(plan)
            }
            Err(err) => {
                warn!(
                    "event=plan_analyze module=plan status=degraded duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                ExtractionOutcome::Failed(err.to_string())
            }
        }
    }

    fn try_extract(&self, title: &str, content: &str) -> Result<Plan, AnalyzeError> {
        let request = build_request(title, content);
        let raw_text = self.service.complete(&request)?;
        let payload: Value = serde_json::from_str(strip_code_fence(&raw_text))?;
        Ok(normalize_plan(&payload)?)
    }
}

/// Builds the fixed system + user instruction for one note.
pub fn build_request(title: &str, content: &str) -> ExtractionRequest {
    ExtractionRequest {
        messages: vec![
            ChatMessage::system(EXTRACTION_INSTRUCTION),
            ChatMessage::user(format!("Title: {title}\n\nContent:\n{content}")),
        ],
    }
}

/// Degraded result for a failed analysis.
pub fn failure_result(reason: &str) -> AnalysisResult {
    AnalysisResult {
        summary: format!(
            "{FAILURE_SUMMARY_PREFIX}{}",
            truncate_chars(reason, FAILURE_DETAIL_MAX_CHARS)
        ),
        goals: Vec::new(),
        diagram: ERROR_DIAGRAM.to_string(),
    }
}

/// Removes one surrounding Markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}
