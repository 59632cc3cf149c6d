pub mod analysis;
pub mod config;
pub mod guardrails;
pub mod llm;
pub mod provider;
