//! Normalizing free-text remote responses into reports.
//!
//! The remote service is asked for a single JSON object, but in practice
//! answers arrive wrapped in Markdown fences, with float scores, with
//! nulls, or not as JSON at all. Parsing is pure: the same text always
//! yields the same report or the same error.
//!
//! Bodies are checked against `schema/report.schema.json` before serde
//! sees them, so a wrong shape is reported with every offending path.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::scoring::base_score;
use crate::types::{Ingredient, SafetyReport};

lazy_static! {
    /// A whole-body Markdown code fence with an optional language tag.
    static ref CODE_FENCE: Regex = Regex::new(
        r"(?s)^```[A-Za-z0-9_+-]*[ \t]*\r?\n?(?P<body>.*?)\s*```$"
    ).unwrap();

    /// Compiled shape check for remote bodies; `Err` holds why it could not be built.
    static ref REPORT_SCHEMA: Result<jsonschema::Validator, String> =
        serde_json::from_str(include_str!("../schema/report.schema.json"))
            .map_err(|e| format!("embedded report schema is not JSON: {e}"))
            .and_then(|schema: serde_json::Value| {
                jsonschema::options()
                    .build(&schema)
                    .map_err(|e| format!("embedded report schema does not compile: {e}"))
            });
}

/// Errors from parsing a remote response.
#[derive(Error, Debug)]
pub enum ReportParseError {
    #[error("Remote response was empty")]
    Empty,

    #[error("Remote response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote response does not match the report schema: {}", .0.join("; "))]
    Schema(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RemoteReport {
    #[serde(default)]
    score: Option<f64>,

    #[serde(default)]
    summary: Option<String>,

    ingredients: Vec<Ingredient>,
}

/// Every way `body` departs from the remote report shape, as `"<message> at <path>"`.
fn schema_violations(body: &serde_json::Value) -> Vec<String> {
    match REPORT_SCHEMA.as_ref() {
        Ok(validator) => validator
            .iter_errors(body)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect(),
        Err(reason) => vec![reason.clone()],
    }
}

/// Remove a surrounding Markdown code fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.name("body")) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// Parse remote text into a report without conflicts.
///
/// - Fences are stripped and the body validated against the report schema
/// - Ingredients are normalized; nameless entries are dropped
/// - The score is rounded and clamped, or computed from statuses if missing
/// - The summary is always derived from the score
pub fn parse_remote_report(text: &str) -> Result<SafetyReport, ReportParseError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ReportParseError::Empty);
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    let violations = schema_violations(&value);
    if !violations.is_empty() {
        return Err(ReportParseError::Schema(violations));
    }
    let remote: RemoteReport = serde_json::from_value(value)?;

    if let Some(summary) = remote.summary.as_deref() {
        tracing::trace!(summary, "Remote summary replaced by score verdict");
    }

    let total = remote.ingredients.len();
    let ingredients: Vec<Ingredient> = remote
        .ingredients
        .into_iter()
        .map(Ingredient::normalize)
        .filter(|i| !i.name.is_empty())
        .collect();
    if ingredients.len() < total {
        tracing::debug!(dropped = total - ingredients.len(), "Dropped nameless ingredients");
    }

    let score = match remote.score.filter(|s| s.is_finite()) {
        Some(score) => score.round() as i64,
        None => i64::from(base_score(&ingredients)),
    };

    Ok(SafetyReport::with_score(ingredients, score))
}
