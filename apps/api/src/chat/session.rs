//! Chat sessions: a stateful conversational context behind a single `send`.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::chat::prompts::build_chat_system;
use crate::llm_client::{Content, GeminiClient, LlmError, LlmRequest, CHAT_MODEL};
use crate::profile::models::Profile;

#[derive(Debug, Error)]
pub enum ChatTransportError {
    #[error("chat turn failed: {0}")]
    Llm(#[from] LlmError),
}

/// One grounded conversation. Keeps its own history: callers send only the new turn.
#[async_trait]
pub trait ChatSession: Send + Sync {
    async fn send(&self, turn: &str) -> Result<String, ChatTransportError>;
}

/// Opens a fresh session grounded on a profile. Carried in `AppState` as `Arc<dyn ChatSessionFactory>`.
pub trait ChatSessionFactory: Send + Sync {
    fn open(&self, profile: &Profile) -> Arc<dyn ChatSession>;
}

/// Gemini-backed session. The history lives here and is replayed on every turn.
pub struct GeminiChatSession {
    llm: GeminiClient,
    system: String,
    history: Mutex<Vec<Content>>,
}

impl GeminiChatSession {
    pub fn new(llm: GeminiClient, profile: &Profile) -> Self {
        Self {
            llm,
            system: build_chat_system(profile),
            history: Mutex::new(Vec::new()),
        }
    }

    #[cfg(test)]
    async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send(&self, turn: &str) -> Result<String, ChatTransportError> {
        let mut history = self.history.lock().await;

        let mut contents = history.clone();
        contents.push(Content::user_text(turn));

        let request = LlmRequest::new(CHAT_MODEL, &contents).system(&self.system);
        let reply = self.llm.call_text(request).await?;

        // A failed turn leaves no trace in the history.
        history.push(Content::user_text(turn));
        history.push(Content::model_text(reply.clone()));
        debug!("Chat session now holds {} turns", history.len());

        Ok(reply)
    }
}

pub struct GeminiChatFactory {
    llm: GeminiClient,
}

impl GeminiChatFactory {
    pub fn new(llm: GeminiClient) -> Self {
        Self { llm }
    }
}

impl ChatSessionFactory for GeminiChatFactory {
    fn open(&self, profile: &Profile) -> Arc<dyn ChatSession> {
        Arc::new(GeminiChatSession::new(self.llm.clone(), profile))
    }
}
