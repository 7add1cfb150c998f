//! Extraction gateway: turns an uploaded CV into a `PartialProfile`.
//!
//! One attempt per upload, no retries. The caller decides what a failure
//! means for the onboarding flow (stay on the upload step).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{
    Content, GeminiClient, InlineData, LlmError, LlmRequest, Part, EXTRACTION_MODEL,
};
use crate::profile::models::PartialProfile;

pub mod document;
pub mod prompts;

pub use document::{CvDocument, DocumentError};
use prompts::{extraction_schema, CV_EXTRACTION_PROMPT, MAX_EXTRACTED_SKILLS};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("CV extraction failed: {0}")]
    Llm(#[from] LlmError),
}

impl ExtractionError {
    pub fn is_configuration(&self) -> bool {
        match self {
            ExtractionError::Llm(e) => e.is_configuration(),
        }
    }
}

/// Extracts profile fields from a CV. Carried in `AppState` as `Arc<dyn ProfileExtractor>`.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    async fn extract(&self, document: &CvDocument) -> Result<PartialProfile, ExtractionError>;
}

/// Production extractor backed by Gemini's multimodal input.
pub struct GeminiProfileExtractor {
    llm: GeminiClient,
    schema: Value,
}

impl GeminiProfileExtractor {
    pub fn new(llm: GeminiClient) -> Self {
        Self {
            llm,
            schema: extraction_schema(),
        }
    }
}

#[async_trait]
impl ProfileExtractor for GeminiProfileExtractor {
    async fn extract(&self, document: &CvDocument) -> Result<PartialProfile, ExtractionError> {
        info!(
            "Extracting profile from CV ({}, {} base64 bytes)",
            document.mime_type,
            document.data.len()
        );

        let contents = [Content::user(vec![
            Part::InlineData(InlineData {
                mime_type: document.mime_type.clone(),
                data: document.data.clone(),
            }),
            Part::Text(CV_EXTRACTION_PROMPT.to_string()),
        ])];

        let request = LlmRequest::new(EXTRACTION_MODEL, &contents).system(JSON_ONLY_SYSTEM);
        let partial: PartialProfile = self.llm.call_json(request, &self.schema).await?;

        Ok(cap_skills(partial))
    }
}

/// Keeps at most `MAX_EXTRACTED_SKILLS`, preserving the model's importance order.
fn cap_skills(mut partial: PartialProfile) -> PartialProfile {
    if let Some(skills) = partial.skills.as_mut() {
        if skills.len() > MAX_EXTRACTED_SKILLS {
            warn!(
                "Extraction returned {} skills; keeping the first {}",
                skills.len(),
                MAX_EXTRACTED_SKILLS
            );
            skills.truncate(MAX_EXTRACTED_SKILLS);
        }
    }
    partial
}
