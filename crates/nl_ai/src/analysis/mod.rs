use nl_core::domain::{AnalysisResult, InputType};
use nl_core::error::AppError;
use nl_core::session::Analyzer;
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::AnalyzerConfig;
use crate::guardrails::{parse_assessment, unquoted_highlights};
use crate::llm::gemini_llm::GeminiLlm;
use crate::llm::{GenerateRequest, Llm};
use crate::provider::ProviderClient;

pub mod prompts;

/// Stateless misinformation analysis over an [`Llm`] transport.
#[derive(Debug, Clone)]
pub struct AnalysisClient<L> {
    llm: L,
    model: String,
}

impl<L: Llm> AnalysisClient<L> {
    pub fn new(llm: L, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }
}

impl AnalysisClient<GeminiLlm> {
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AppError> {
        let client = ProviderClient::from_config(config)?;
        Ok(Self::new(GeminiLlm::new(client), config.model.clone()))
    }
}

/// Short digest of the submitted text so logs can correlate requests without the text itself.
pub fn text_fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(digest)[..12].to_string()
}

impl<L: Llm> Analyzer for AnalysisClient<L> {
    fn analyze(&self, text: &str, input_type: InputType) -> Result<AnalysisResult, AppError> {
        let fingerprint = text_fingerprint(text);
        tracing::debug!(
            %fingerprint,
            model = %self.model,
            input_type = input_type.label(),
            template = prompts::PROMPT_TEMPLATE_VERSION,
            "requesting analysis"
        );

        let user_message = prompts::user_message(input_type, text);
        let schema = prompts::response_schema();
        let req = GenerateRequest {
            system_instruction: prompts::SYSTEM_INSTRUCTION,
            user_message: &user_message,
            temperature: prompts::ANALYSIS_TEMPERATURE,
            response_schema: &schema,
        };

        let body = self.llm.generate(&self.model, &req)?;
        let assessment = parse_assessment(&body)?;

        if assessment.stated_verdict != assessment.verdict {
            tracing::warn!(
                %fingerprint,
                score = assessment.score,
                stated = assessment.stated_verdict.label(),
                derived = assessment.verdict.label(),
                "model verdict disagrees with score; using score"
            );
        }
        let unquoted = unquoted_highlights(&assessment.highlights, text);
        if !unquoted.is_empty() {
            tracing::debug!(
                %fingerprint,
                unquoted = unquoted.len(),
                "highlights not found verbatim in input"
            );
        }

        let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
            AppError::new("ANALYSIS_TIME_FAILED", "Failed to format timestamp")
                .with_details(e.to_string())
        })?;

        Ok(AnalysisResult {
            id: Uuid::new_v4().to_string(),
            timestamp,
            score: assessment.score,
            verdict: assessment.verdict,
            highlights: assessment.highlights,
            confidence: assessment.confidence,
            summary: assessment.summary,
            next_steps: assessment.next_steps,
            input_text: text.to_string(),
            input_type,
        })
    }
}
