use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::chat::SendError;
use crate::extraction::{DocumentError, ExtractionError};
use crate::profile::onboarding::TransitionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// A second trigger of an operation that is still in flight.
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Analysis error: {0}")]
    Analysis(String),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::InvalidTransition(e.to_string())
    }
}

impl From<DocumentError> for AppError {
    fn from(e: DocumentError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        if e.is_configuration() {
            AppError::Configuration(e.to_string())
        } else {
            AppError::Extraction(e.to_string())
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        if e.is_configuration() {
            AppError::Configuration(e.to_string())
        } else {
            AppError::Analysis(e.to_string())
        }
    }
}

impl From<SendError> for AppError {
    fn from(e: SendError) -> Self {
        match e {
            SendError::Empty => AppError::Validation(e.to_string()),
            SendError::Busy => AppError::Busy(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone())
            }
            AppError::Busy(msg) => (StatusCode::CONFLICT, "BUSY", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CONFIGURATION_ERROR",
                    "The AI service is not configured. Set GEMINI_API_KEY and restart the server."
                        .to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::error!("CV analysis failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_ERROR",
                    "Could not analyze CV. Please enter details manually.".to_string(),
                )
            }
            AppError::Analysis(msg) => {
                tracing::error!("Analysis failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_ERROR",
                    "Something went wrong while analyzing your profile. Please try again."
                        .to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_missing_key_maps_to_configuration_not_request_failure() {
        let err: AppError = ExtractionError::Llm(LlmError::MissingApiKey).into();
        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AppError = AnalysisError::Llm(LlmError::MissingApiKey).into();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_gateway_failures_are_bad_gateway() {
        let err: AppError = ExtractionError::Llm(LlmError::EmptyContent).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err: AppError = AnalysisError::ContractViolation(vec!["x".into()]).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_busy_and_transition_are_conflicts() {
        let busy: AppError = SendError::Busy.into();
        assert_eq!(busy.into_response().status(), StatusCode::CONFLICT);

        let transition: AppError = TransitionError::AlreadySubmitted.into();
        assert_eq!(transition.into_response().status(), StatusCode::CONFLICT);

        let empty: AppError = SendError::Empty.into();
        assert_eq!(empty.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
