//! Analysis gateway: turns a completed `Profile` into a `CareerAnalysis`.
//!
//! Flow: build prompt from every profile field → schema-constrained LLM call →
//! strict JSON parse → contract check. No retries; the onboarding flow keeps
//! the profile so the user can submit again.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{Content, GeminiClient, LlmError, LlmRequest, ANALYSIS_MODEL};
use crate::profile::models::Profile;

pub mod models;
pub mod prompts;
pub mod validation;

pub use models::CareerAnalysis;
use prompts::{analysis_schema, build_analysis_prompt, ANALYSIS_SYSTEM};
use validation::check_contract;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("career analysis failed: {0}")]
    Llm(#[from] LlmError),

    #[error("career analysis broke the response contract: {}", .0.join("; "))]
    ContractViolation(Vec<String>),
}

impl AnalysisError {
    pub fn is_configuration(&self) -> bool {
        match self {
            AnalysisError::Llm(e) => e.is_configuration(),
            AnalysisError::ContractViolation(_) => false,
        }
    }
}

/// Produces a career analysis. Carried in `AppState` as `Arc<dyn CareerAnalyzer>`.
#[async_trait]
pub trait CareerAnalyzer: Send + Sync {
    async fn analyze(&self, profile: &Profile) -> Result<CareerAnalysis, AnalysisError>;
}

/// Accepts a parsed document only if it satisfies the section-count contract.
pub fn accept_analysis(analysis: CareerAnalysis) -> Result<CareerAnalysis, AnalysisError> {
    let report = check_contract(&analysis);
    if !report.passed() {
        warn!(
            "Rejecting career analysis: {}",
            report.violations.join("; ")
        );
        return Err(AnalysisError::ContractViolation(report.violations));
    }
    Ok(analysis)
}

/// Production analyzer backed by Gemini structured output.
pub struct GeminiCareerAnalyzer {
    llm: GeminiClient,
    schema: Value,
}

impl GeminiCareerAnalyzer {
    pub fn new(llm: GeminiClient) -> Self {
        Self {
            llm,
            schema: analysis_schema(),
        }
    }
}

#[async_trait]
impl CareerAnalyzer for GeminiCareerAnalyzer {
    async fn analyze(&self, profile: &Profile) -> Result<CareerAnalysis, AnalysisError> {
        info!(
            "Requesting career analysis: {} -> {} ({})",
            profile.current_role, profile.target_role, profile.career_path
        );

        let contents = [Content::user_text(build_analysis_prompt(profile))];
        let request = LlmRequest::new(ANALYSIS_MODEL, &contents).system(ANALYSIS_SYSTEM);
        let analysis: CareerAnalysis = self.llm.call_json(request, &self.schema).await?;

        accept_analysis(analysis)
    }
}
