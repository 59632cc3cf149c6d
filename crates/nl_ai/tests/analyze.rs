use std::cell::RefCell;

use pretty_assertions::assert_eq;

use nl_ai::analysis::prompts::{ANALYSIS_TEMPERATURE, SYSTEM_INSTRUCTION};
use nl_ai::analysis::AnalysisClient;
use nl_ai::llm::{GenerateRequest, Llm};
use nl_core::domain::{InputType, Verdict};
use nl_core::error::{AppError, ErrorKind};
use nl_core::session::Analyzer;

const FLAT_EARTH: &str = "Scientists confirm the earth is flat and NASA is lying to everyone!!!";

#[derive(Debug, Clone)]
struct Captured {
    model: String,
    system_instruction: String,
    user_message: String,
    temperature: f64,
    schema: serde_json::Value,
}

struct MockLlm {
    out: Result<String, AppError>,
    seen: RefCell<Vec<Captured>>,
}

impl MockLlm {
    fn returning(out: &str) -> Self {
        Self {
            out: Ok(out.to_string()),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn failing(err: AppError) -> Self {
        Self {
            out: Err(err),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Llm for MockLlm {
    fn generate(&self, model: &str, req: &GenerateRequest<'_>) -> Result<String, AppError> {
        self.seen.borrow_mut().push(Captured {
            model: model.to_string(),
            system_instruction: req.system_instruction.to_string(),
            user_message: req.user_message.to_string(),
            temperature: req.temperature,
            schema: req.response_schema.clone(),
        });
        self.out.clone()
    }
}

fn flat_earth_body() -> String {
    serde_json::json!({
        "score": 94,
        "verdict": "Likely Fake",
        "highlights": [
            {"text": "NASA is lying to everyone!!!", "rationale": "Sensational Language"},
            {"text": "Scientists confirm", "rationale": "Unverified Claim"}
        ],
        "confidence": 0.91,
        "summary": "The claim contradicts established science and cites no sources.",
        "nextSteps": [
            {"name": "Snopes", "url": "https://www.snopes.com"},
            {"name": "AP Fact Check", "url": "https://apnews.com/ap-fact-check"}
        ]
    })
    .to_string()
}

fn body_without(field: &str) -> String {
    let mut v: serde_json::Value = serde_json::from_str(&flat_earth_body()).expect("fixture");
    v.as_object_mut().expect("object").remove(field);
    v.to_string()
}

fn body_with(field: &str, value: serde_json::Value) -> String {
    let mut v: serde_json::Value = serde_json::from_str(&flat_earth_body()).expect("fixture");
    v[field] = value;
    v.to_string()
}

fn analyze_with(body: &str) -> Result<nl_core::domain::AnalysisResult, AppError> {
    let client = AnalysisClient::new(MockLlm::returning(body), "mock-model");
    client.analyze(FLAT_EARTH, InputType::Headline)
}

#[test]
fn flat_earth_headline_is_likely_fake_with_highlights() {
    let client = AnalysisClient::new(MockLlm::returning(&flat_earth_body()), "mock-model");
    let r = client.analyze(FLAT_EARTH, InputType::Headline).expect("analyze");

    assert!(r.score >= 67);
    assert_eq!(r.verdict, Verdict::LikelyFake);
    assert!(!r.highlights.is_empty());
    assert_eq!(r.next_steps.len(), 2);
    assert_eq!(r.input_text, FLAT_EARTH);
    assert_eq!(r.input_type, InputType::Headline);
    assert_eq!(r.id.len(), 36);
    assert!(r.timestamp.ends_with('Z'));
}

#[test]
fn request_is_shaped_from_input_type_and_text() {
    let llm = MockLlm::returning(&flat_earth_body());
    let client = AnalysisClient::new(&llm, "gemini-2.5-flash");
    client
        .analyze(FLAT_EARTH, InputType::ShortArticle)
        .expect("analyze");

    let seen = llm.seen.borrow();
    assert_eq!(seen.len(), 1);
    let c = &seen[0];
    assert_eq!(c.model, "gemini-2.5-flash");
    assert_eq!(
        c.user_message,
        format!("Analyze the following 'Short article (<=500 words)': \"{FLAT_EARTH}\"")
    );
    assert_eq!(c.system_instruction, SYSTEM_INSTRUCTION);
    assert!(c.system_instruction.contains("67-100 is \"Likely Fake\""));
    assert_eq!(c.temperature, ANALYSIS_TEMPERATURE);

    let required: Vec<&str> = c.schema["required"]
        .as_array()
        .expect("required")
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(
        required,
        vec!["score", "verdict", "highlights", "confidence", "summary", "nextSteps"]
    );
}

#[test]
fn each_call_gets_a_fresh_id() {
    let client = AnalysisClient::new(MockLlm::returning(&flat_earth_body()), "mock-model");
    let a = client.analyze(FLAT_EARTH, InputType::Headline).expect("a");
    let b = client.analyze(FLAT_EARTH, InputType::Headline).expect("b");
    assert_ne!(a.id, b.id);
}

#[test]
fn missing_required_fields_are_schema_errors() {
    for field in ["score", "verdict", "highlights", "confidence", "summary", "nextSteps"] {
        let err = analyze_with(&body_without(field)).expect_err(field);
        assert_eq!(err.code, "AI_RESPONSE_INVALID", "field {field}");
        assert_eq!(err.kind(), ErrorKind::Schema);
    }
}

#[test]
fn out_of_range_values_are_schema_errors() {
    for body in [
        body_with("score", serde_json::json!(101)),
        body_with("score", serde_json::json!(-1)),
        body_with("confidence", serde_json::json!(1.5)),
        body_with("confidence", serde_json::json!(-0.01)),
        body_with("verdict", serde_json::json!("Definitely Fake")),
        body_with("score", serde_json::json!("94")),
    ] {
        let err = analyze_with(&body).expect_err("invalid");
        assert_eq!(err.code, "AI_RESPONSE_INVALID", "body {body}");
    }
}

#[test]
fn empty_or_non_json_bodies_are_schema_errors() {
    for body in ["", "   \n", "Sure! Here is the analysis:", "```json\n{}\n```"] {
        let err = analyze_with(body).expect_err("invalid");
        assert_eq!(err.code, "AI_RESPONSE_INVALID", "body {body:?}");
    }
    let wrapped = format!("Here you go: {}", flat_earth_body());
    assert_eq!(analyze_with(&wrapped).expect_err("prose").code, "AI_RESPONSE_INVALID");
}

#[test]
fn boundary_scores_are_accepted() {
    for (score, verdict) in [(0, Verdict::LikelyReal), (100, Verdict::LikelyFake)] {
        let r = analyze_with(&body_with("score", serde_json::json!(score))).expect("in range");
        assert_eq!(r.score, score);
        assert_eq!(r.verdict, verdict);
    }
}

#[test]
fn verdict_is_derived_from_score_not_trusted() {
    let body = body_with("score", serde_json::json!(40));
    let r = analyze_with(&body).expect("analyze");
    // Model said "Likely Fake"; 40 falls in the middle band.
    assert_eq!(r.verdict, Verdict::PossiblyFalse);
}

#[test]
fn unquoted_highlights_are_kept() {
    let body = body_with(
        "highlights",
        serde_json::json!([{"text": "not in the input", "rationale": "Loaded Question"}]),
    );
    let r = analyze_with(&body).expect("analyze");
    assert_eq!(r.highlights.len(), 1);
}

#[test]
fn transport_errors_pass_through() {
    let err = AppError::new("AI_TRANSPORT_FAILED", "Failed to reach analysis provider")
        .with_retryable(true);
    let client = AnalysisClient::new(MockLlm::failing(err), "mock-model");
    let got = client
        .analyze(FLAT_EARTH, InputType::LongArticle)
        .expect_err("transport");
    assert_eq!(got.kind(), ErrorKind::Transport);
    assert!(got.retryable);
}
