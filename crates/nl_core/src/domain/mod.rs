use serde::{Deserialize, Deserializer, Serialize};

/// Shape of the submitted text. Only changes how the prompt frames the text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InputType {
    #[serde(rename = "Headline")]
    Headline,
    #[default]
    #[serde(rename = "Short article (<=500 words)", alias = "Short article")]
    ShortArticle,
    #[serde(rename = "Long article")]
    LongArticle,
}

impl InputType {
    pub fn label(&self) -> &'static str {
        match self {
            InputType::Headline => "Headline",
            InputType::ShortArticle => "Short article (<=500 words)",
            InputType::LongArticle => "Long article",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Verdict {
    #[serde(rename = "Likely Real")]
    LikelyReal,
    #[serde(rename = "Possibly False")]
    PossiblyFalse,
    #[serde(rename = "Likely Fake")]
    LikelyFake,
}

impl Verdict {
    /// Tertile partition of the fake-probability score: 0-33, 34-66, 67-100.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=33 => Verdict::LikelyReal,
            34..=66 => Verdict::PossiblyFalse,
            _ => Verdict::LikelyFake,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::LikelyReal => "Likely Real",
            Verdict::PossiblyFalse => "Possibly False",
            Verdict::LikelyFake => "Likely Fake",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Likely Real" => Some(Verdict::LikelyReal),
            "Possibly False" => Some(Verdict::PossiblyFalse),
            "Likely Fake" => Some(Verdict::LikelyFake),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    pub text: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NextStep {
    pub name: String,
    pub url: String,
}

/// A completed assessment as shown to the user and kept in history.
///
/// Notes:
/// - `id`, `timestamp`, `input_text` and `input_type` are stamped locally; the model never
///   supplies them.
/// - `verdict` always agrees with `score` under [`Verdict::from_score`].
/// - Field names serialize as camelCase so stored history stays readable by older records.
/// - `score` is read from any JSON number; older records kept the model's raw, possibly
///   fractional, value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub timestamp: String,
    #[serde(deserialize_with = "score_from_number")]
    pub score: u8,
    pub verdict: Verdict,
    pub highlights: Vec<Highlight>,
    pub confidence: f64,
    pub summary: String,
    pub next_steps: Vec<NextStep>,
    pub input_text: String,
    pub input_type: InputType,
}

impl AnalysisResult {
    pub fn verdict_is_consistent(&self) -> bool {
        self.verdict == Verdict::from_score(self.score)
    }

    /// Confidence is a probability; NaN does not survive a JSON round trip.
    pub fn confidence_in_range(&self) -> bool {
        self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)
    }
}

/// Round to the nearest integer and clamp to 0-100.
fn score_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl PersistenceWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_boundaries_follow_tertiles() {
        assert_eq!(Verdict::from_score(0), Verdict::LikelyReal);
        assert_eq!(Verdict::from_score(33), Verdict::LikelyReal);
        assert_eq!(Verdict::from_score(34), Verdict::PossiblyFalse);
        assert_eq!(Verdict::from_score(66), Verdict::PossiblyFalse);
        assert_eq!(Verdict::from_score(67), Verdict::LikelyFake);
        assert_eq!(Verdict::from_score(100), Verdict::LikelyFake);
    }

    #[test]
    fn input_type_accepts_short_alias() {
        let t: InputType = serde_json::from_str("\"Short article\"").expect("alias");
        assert_eq!(t, InputType::ShortArticle);
        assert_eq!(
            serde_json::to_string(&t).expect("encode"),
            "\"Short article (<=500 words)\""
        );
    }

    #[test]
    fn default_input_type_is_short_article() {
        assert_eq!(InputType::default(), InputType::ShortArticle);
    }

    #[test]
    fn fractional_and_out_of_range_scores_are_normalized_on_read() {
        let record = |score: &str| {
            format!(
                r#"{{"id":"a","timestamp":"2026-01-01T00:00:00Z","score":{score},"verdict":"Likely Fake","highlights":[],"confidence":0.5,"summary":"s","nextSteps":[],"inputText":"t","inputType":"Headline"}}"#
            )
        };
        let score = |raw: &str| {
            serde_json::from_str::<AnalysisResult>(&record(raw))
                .expect("decode")
                .score
        };
        assert_eq!(score("72.6"), 73);
        assert_eq!(score("33.4"), 33);
        assert_eq!(score("104"), 100);
        assert_eq!(score("-3"), 0);
        assert!(serde_json::from_str::<AnalysisResult>(&record("\"94\"")).is_err());
    }

    #[test]
    fn confidence_range_excludes_nan() {
        let mut r: AnalysisResult = serde_json::from_str(
            r#"{"id":"a","timestamp":"t","score":10,"verdict":"Likely Real","highlights":[],"confidence":1.0,"summary":"s","nextSteps":[],"inputText":"t","inputType":"Headline"}"#,
        )
        .expect("decode");
        assert!(r.confidence_in_range());
        r.confidence = f64::NAN;
        assert!(!r.confidence_in_range());
        r.confidence = 1.5;
        assert!(!r.confidence_in_range());
    }

    #[test]
    fn result_serializes_camel_case() {
        let r = AnalysisResult {
            id: "a".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            score: 10,
            verdict: Verdict::LikelyReal,
            highlights: vec![],
            confidence: 0.5,
            summary: "ok".to_string(),
            next_steps: vec![],
            input_text: "text".to_string(),
            input_type: InputType::Headline,
        };
        let v = serde_json::to_value(&r).expect("encode");
        assert!(v.get("nextSteps").is_some());
        assert!(v.get("inputText").is_some());
        assert_eq!(v["verdict"], "Likely Real");
    }
}
