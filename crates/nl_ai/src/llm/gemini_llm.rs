use nl_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{GenerateRequest, Llm};
use crate::provider::ProviderClient;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// `generateContent` over blocking HTTP.
#[derive(Debug, Clone)]
pub struct GeminiLlm {
    client: ProviderClient,
}

impl GeminiLlm {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ProviderClient {
        &self.client
    }
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f64,
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: RequestContent<'a>,
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn build_body<'a>(req: &'a GenerateRequest<'a>) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        system_instruction: RequestContent {
            role: None,
            parts: vec![TextPart {
                text: req.system_instruction,
            }],
        },
        contents: vec![RequestContent {
            role: Some("user"),
            parts: vec![TextPart {
                text: req.user_message,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: req.temperature,
            response_mime_type: "application/json",
            response_schema: req.response_schema,
        },
    }
}

/// Concatenate the first candidate's text parts.
pub(crate) fn extract_text(resp: GenerateContentResponse) -> Result<String, AppError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(
            AppError::new("AI_PROVIDER_REJECTED", "Analysis provider blocked the request")
                .with_details(format!("block_reason={reason}")),
        );
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(AppError::new(
            "AI_RESPONSE_INVALID",
            "Analysis provider returned no candidates",
        ));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AppError::new(
            "AI_RESPONSE_INVALID",
            "Received an empty response from the API",
        )
        .with_details(format!(
            "finish_reason={}",
            candidate.finish_reason.as_deref().unwrap_or("UNKNOWN")
        )));
    }
    Ok(text)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

impl Llm for GeminiLlm {
    fn generate(&self, model: &str, req: &GenerateRequest<'_>) -> Result<String, AppError> {
        let url = format!("{}:generateContent", self.client.model_url(model));
        let body = serde_json::to_value(build_body(req)).map_err(|e| {
            AppError::new("AI_REQUEST_ENCODE_FAILED", "Failed to encode analysis request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .set("x-goog-api-key", self.client.api_key())
            .timeout(self.client.timeout())
            .send_json(body);

        match resp {
            Ok(r) => {
                let v: GenerateContentResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_RESPONSE_INVALID", "Failed to decode provider response")
                        .with_details(e.to_string())
                })?;
                extract_text(v)
            }
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new(
                    "AI_PROVIDER_REJECTED",
                    "Analysis provider rejected the request",
                )
                .with_details(format!(
                    "status={code}; body={}",
                    truncate(&body, MAX_ERROR_BODY_CHARS)
                ))
                .with_retryable(code == 429 || code >= 500))
            }
            Err(e) => Err(AppError::new(
                "AI_TRANSPORT_FAILED",
                "Failed to reach analysis provider",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}
