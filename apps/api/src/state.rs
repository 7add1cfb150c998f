use std::sync::Arc;

use crate::analysis::CareerAnalyzer;
use crate::chat::session::ChatSessionFactory;
use crate::config::Config;
use crate::extraction::ProfileExtractor;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// CV extraction gateway. Default: Gemini multimodal structured output.
    pub extractor: Arc<dyn ProfileExtractor>,
    /// Career analysis gateway. Default: Gemini structured output.
    pub analyzer: Arc<dyn CareerAnalyzer>,
    /// Opens one consultant chat session per conversation.
    pub chat: Arc<dyn ChatSessionFactory>,
    /// False when no API key was found at startup; reported by /health.
    pub llm_configured: bool,
}
