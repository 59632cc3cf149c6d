use nl_core::domain::{Highlight, NextStep, Verdict};
use nl_core::error::AppError;
use serde::Deserialize;

/// Model output after structural and range checks. `verdict` is derived from `score`;
/// `stated_verdict` is what the model claimed.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub score: u8,
    pub verdict: Verdict,
    pub stated_verdict: Verdict,
    pub highlights: Vec<Highlight>,
    pub confidence: f64,
    pub summary: String,
    pub next_steps: Vec<NextStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    score: f64,
    verdict: String,
    highlights: Vec<Highlight>,
    confidence: f64,
    summary: String,
    next_steps: Vec<NextStep>,
}

fn invalid(details: impl Into<String>) -> AppError {
    AppError::new(
        "AI_RESPONSE_INVALID",
        "Analysis response did not match the expected schema",
    )
    .with_details(details)
}

/// Parse and validate the model's JSON body. The body must be exactly one JSON object.
pub fn parse_assessment(body: &str) -> Result<Assessment, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(invalid("empty response body"));
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| invalid(format!("not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(invalid("top-level value is not an object"));
    }
    let raw: RawAssessment =
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

    if !raw.score.is_finite() || !(0.0..=100.0).contains(&raw.score) {
        return Err(invalid(format!("score out of range: {}", raw.score)));
    }
    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(invalid(format!("confidence out of range: {}", raw.confidence)));
    }
    let stated_verdict = Verdict::from_label(&raw.verdict)
        .ok_or_else(|| invalid(format!("unknown verdict: {}", raw.verdict)))?;

    // In range, so the rounded value fits.
    let score = raw.score.round() as u8;

    Ok(Assessment {
        score,
        verdict: Verdict::from_score(score),
        stated_verdict,
        highlights: raw.highlights,
        confidence: raw.confidence,
        summary: raw.summary,
        next_steps: raw.next_steps,
    })
}

/// Indices of highlights whose quote does not appear in `input`. Best effort only: quotes are
/// compared after collapsing whitespace.
pub fn unquoted_highlights(highlights: &[Highlight], input: &str) -> Vec<usize> {
    let haystack = collapse_whitespace(input);
    highlights
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let needle = collapse_whitespace(&h.text);
            needle.is_empty() || !haystack.contains(&needle)
        })
        .map(|(i, _)| i)
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
