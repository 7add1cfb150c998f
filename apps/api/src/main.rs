mod analysis;
mod chat;
mod config;
mod errors;
mod extraction;
mod in_flight;
mod llm_client;
mod profile;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::GeminiCareerAnalyzer;
use crate::chat::session::GeminiChatFactory;
use crate::config::Config;
use crate::extraction::GeminiProfileExtractor;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

/// How often idle coaching sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerPath API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Gemini client
    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_base_url,
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    if llm.has_api_key() {
        info!(
            "Gemini client initialized (extraction: {}, analysis: {}, chat: {})",
            llm_client::EXTRACTION_MODEL,
            llm_client::ANALYSIS_MODEL,
            llm_client::CHAT_MODEL
        );
    } else {
        warn!("GEMINI_API_KEY is not set; CV extraction, analysis and chat will be unavailable");
    }

    // Initialize session store and its idle sweeper
    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
    sessions.spawn_eviction(SESSION_SWEEP_INTERVAL);
    info!("Session store initialized (idle TTL: {}s)", config.session_ttl_secs);

    let state = AppState {
        config: config.clone(),
        sessions,
        extractor: Arc::new(GeminiProfileExtractor::new(llm.clone())),
        analyzer: Arc::new(GeminiCareerAnalyzer::new(llm.clone())),
        chat: Arc::new(GeminiChatFactory::new(llm.clone())),
        llm_configured: llm.has_api_key(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
