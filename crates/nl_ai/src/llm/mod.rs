use nl_core::error::AppError;

/// One structured-output generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub system_instruction: &'a str,
    pub user_message: &'a str,
    pub temperature: f64,
    pub response_schema: &'a serde_json::Value,
}

/// Transport to a hosted model. Returns the raw response text; callers validate it.
pub trait Llm {
    fn generate(&self, model: &str, req: &GenerateRequest<'_>) -> Result<String, AppError>;
}

impl<L: Llm + ?Sized> Llm for &L {
    fn generate(&self, model: &str, req: &GenerateRequest<'_>) -> Result<String, AppError> {
        (**self).generate(model, req)
    }
}

pub mod gemini_llm;
