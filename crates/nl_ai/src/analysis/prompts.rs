use nl_core::domain::InputType;
use serde_json::{json, Value};

pub const ANALYSIS_TEMPERATURE: f64 = 0.3;

pub const PROMPT_TEMPLATE_VERSION: &str = "misinfo-v1";

// Keep the contract explicit:
// - verdict thresholds match `Verdict::from_score`
// - output is one JSON object, nothing else
pub const SYSTEM_INSTRUCTION: &str = r#"You are "VeriNews", an assistant that screens news text for signs of misinformation.

Rules (non-negotiable):
1) Treat the text according to its stated type (Headline, Short article, or Long article).
2) Look for markers of misinformation: sensationalism, emotional language, missing or unverifiable sources, logical fallacies, and loaded questions.
3) Give a score from 0 to 100 for how likely the text is FAKE (0 = likely real, 100 = likely fake) and a confidence from 0.0 to 1.0.
4) The verdict MUST follow the score: 0-33 is "Likely Real", 34-66 is "Possibly False", 67-100 is "Likely Fake".
5) Highlights MUST be direct quotes from the text, each with a short rationale tag (e.g. "Sensational Language", "Unverified Claim", "Ad Hominem Attack").
6) Suggest next steps as links to reputable fact-checking resources (e.g. Snopes, PolitiFact, AP Fact Check).

Output:
- Return ONLY one JSON object matching the provided schema.
- No surrounding prose, no Markdown fences.
"#;

pub fn user_message(input_type: InputType, text: &str) -> String {
    format!("Analyze the following '{}': \"{}\"", input_type.label(), text)
}

/// Structured-output schema sent with every request. All six fields are required.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "NUMBER",
                "description": "Probability from 0 to 100 that the text is FAKE news. 0 is likely real, 100 is likely fake."
            },
            "verdict": {
                "type": "STRING",
                "enum": ["Likely Real", "Possibly False", "Likely Fake"],
                "description": "Verdict derived from the score."
            },
            "highlights": {
                "type": "ARRAY",
                "description": "Up to 3 quotes from the text that most influenced the verdict.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": { "type": "STRING", "description": "Direct quote from the text." },
                        "rationale": { "type": "STRING", "description": "Short reason tag, e.g. 'Sensational Language'." }
                    },
                    "required": ["text", "rationale"]
                }
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Certainty of the analysis between 0.0 and 1.0."
            },
            "summary": {
                "type": "STRING",
                "description": "1-2 sentences explaining the verdict with reference to the highlights."
            },
            "nextSteps": {
                "type": "ARRAY",
                "description": "2-3 suggested fact-checking resources.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "url": { "type": "STRING" }
                    },
                    "required": ["name", "url"]
                }
            }
        },
        "required": ["score", "verdict", "highlights", "confidence", "summary", "nextSteps"]
    })
}
