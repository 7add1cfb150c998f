//! The consultant chat transcript as the user sees it.
//!
//! A turn is appended optimistically, the typing flag is held while the
//! session answers, and the reply (or the connection fallback) is appended on
//! completion. Reset keeps only the greeting and drops the session so the
//! next turn opens a fresh one.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chat::models::{ChatMessage, ChatView, Role};
use crate::chat::prompts::{build_greeting, CONNECTION_FALLBACK};
use crate::chat::session::{ChatSession, ChatSessionFactory};
use crate::in_flight::InFlight;
use crate::profile::models::Profile;

const GREETING_ID: &str = "init";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("message cannot be empty")]
    Empty,

    #[error("the consultant is still replying to the previous message")]
    Busy,
}

struct Transcript {
    messages: Vec<ChatMessage>,
    session: Option<Arc<dyn ChatSession>>,
    /// Bumped on reset; replies started under an older epoch are dropped.
    epoch: u64,
    next_seq: u64,
}

impl Transcript {
    fn append(&mut self, role: Role, text: String) -> ChatMessage {
        let last = self.messages.last().map(|m| m.timestamp).unwrap_or(i64::MIN);
        let timestamp = Utc::now().timestamp_millis().max(last);
        self.next_seq += 1;
        let message = ChatMessage {
            id: format!("{timestamp}-{}", self.next_seq),
            role,
            text,
            timestamp,
        };
        self.messages.push(message.clone());
        message
    }
}

pub struct Conversation {
    profile: Profile,
    factory: Arc<dyn ChatSessionFactory>,
    typing: InFlight,
    transcript: Mutex<Transcript>,
}

impl Conversation {
    pub fn new(profile: Profile, factory: Arc<dyn ChatSessionFactory>) -> Self {
        let greeting = ChatMessage {
            id: GREETING_ID.to_string(),
            role: Role::Model,
            text: build_greeting(&profile),
            timestamp: Utc::now().timestamp_millis(),
        };
        Self {
            profile,
            factory,
            typing: InFlight::default(),
            transcript: Mutex::new(Transcript {
                messages: vec![greeting],
                session: None,
                epoch: 0,
                next_seq: 0,
            }),
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_active()
    }

    pub async fn view(&self) -> ChatView {
        ChatView {
            messages: self.transcript.lock().await.messages.clone(),
            typing: self.is_typing(),
        }
    }

    /// Sends one user turn. Returns the appended reply, or `None` when the
    /// conversation was reset while the reply was in flight.
    ///
    /// Transport failures never surface here: they become the fallback reply.
    pub async fn send(&self, text: &str) -> Result<Option<ChatMessage>, SendError> {
        if text.trim().is_empty() {
            return Err(SendError::Empty);
        }
        let _typing = self.typing.try_begin().ok_or(SendError::Busy)?;

        let (session, epoch) = {
            let mut transcript = self.transcript.lock().await;
            transcript.append(Role::User, text.to_string());
            let session = match &transcript.session {
                Some(session) => session.clone(),
                None => {
                    info!("Opening chat session for {}", self.profile.name);
                    let session = self.factory.open(&self.profile);
                    transcript.session = Some(session.clone());
                    session
                }
            };
            (session, transcript.epoch)
        };

        let reply = match session.send(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat error: {e}");
                CONNECTION_FALLBACK.to_string()
            }
        };

        let mut transcript = self.transcript.lock().await;
        if transcript.epoch != epoch {
            debug!("Dropping chat reply that arrived after a reset");
            return Ok(None);
        }
        Ok(Some(transcript.append(Role::Model, reply)))
    }

    /// Truncates the transcript to the greeting and forgets the session.
    pub async fn reset(&self) -> ChatView {
        let mut transcript = self.transcript.lock().await;
        transcript.messages.truncate(1);
        transcript.session = None;
        transcript.epoch += 1;
        info!("Chat reset for {}", self.profile.name);
        ChatView {
            messages: transcript.messages.clone(),
            typing: self.is_typing(),
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use tokio::sync::Notify;

    use super::mocks::{ScriptedChat, ScriptedFactory};
    use super::*;

    fn jane() -> Profile {
        Profile {
            name: "Jane".into(),
            current_role: "Engineer".into(),
            target_role: "Lead Engineer".into(),
            ..Profile::default()
        }
    }

    fn conversation(chat: ScriptedChat) -> (Arc<Conversation>, Arc<ScriptedChat>) {
        let chat = Arc::new(chat);
        let conv = Conversation::new(jane(), Arc::new(ScriptedFactory(chat.clone())));
        (Arc::new(conv), chat)
    }

    #[tokio::test]
    async fn test_starts_with_greeting_only() {
        let (conv, chat) = conversation(ScriptedChat::default());
        let view = conv.view().await;
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].id, "init");
        assert_eq!(view.messages[0].role, Role::Model);
        assert!(view.messages[0].text.starts_with("Hi Jane!"));
        assert!(!view.typing);
        assert_eq!(chat.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_turns_append_user_then_model() {
        let (conv, chat) = conversation(ScriptedChat::default());
        let reply = conv.send("How do I lead?").await.unwrap().unwrap();
        assert_eq!(reply.role, Role::Model);
        assert_eq!(reply.text, "session 1 turn 1: re 'How do I lead?'");
        conv.send("And then?").await.unwrap();

        let view = conv.view().await;
        let roles: Vec<Role> = view.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::Model, Role::User, Role::Model, Role::User, Role::Model]
        );
        assert_eq!(view.messages[3].text, "And then?");
        assert!(view.messages[4].text.starts_with("session 1 turn 2"));
        assert_eq!(chat.opened.load(Ordering::SeqCst), 1);
        assert!(!view.typing);
    }

    #[tokio::test]
    async fn test_ids_unique_and_timestamps_non_decreasing() {
        let (conv, _) = conversation(ScriptedChat::default());
        for i in 0..5 {
            conv.send(&format!("q{i}")).await.unwrap();
        }
        let messages = conv.view().await.messages;
        let mut ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), messages.len());
        assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_failure_appends_fallback_and_clears_typing() {
        let (conv, _) = conversation(ScriptedChat {
            fail: true,
            ..ScriptedChat::default()
        });
        let reply = conv.send("Hello?").await.unwrap().unwrap();
        assert_eq!(reply.text, CONNECTION_FALLBACK);
        assert_eq!(reply.role, Role::Model);
        assert!(!conv.is_typing());
        assert_eq!(conv.view().await.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_blank_turn_rejected_without_call() {
        let (conv, chat) = conversation(ScriptedChat::default());
        assert_eq!(conv.send("   ").await, Err(SendError::Empty));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
        assert_eq!(conv.view().await.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_second_turn_while_typing_dispatches_nothing() {
        let gate = Arc::new(Notify::new());
        let (conv, chat) = conversation(ScriptedChat {
            gate: Some(gate.clone()),
            ..ScriptedChat::default()
        });

        let first = tokio::spawn({
            let conv = conv.clone();
            async move { conv.send("first").await }
        });
        chat.started.notified().await;
        assert!(conv.is_typing());

        assert_eq!(conv.send("second").await, Err(SendError::Busy));

        gate.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
        let texts: Vec<String> = conv.view().await.messages.into_iter().map(|m| m.text).collect();
        assert!(!texts.iter().any(|t| t == "second"));
        assert!(!conv.is_typing());
    }

    #[tokio::test]
    async fn test_reset_keeps_only_greeting_after_many_turns() {
        let (conv, _) = conversation(ScriptedChat::default());
        let greeting = conv.view().await.messages[0].clone();
        for i in 0..4 {
            conv.send(&format!("turn {i}")).await.unwrap();
        }
        let view = conv.reset().await;
        assert_eq!(view.messages, vec![greeting]);
    }

    #[tokio::test]
    async fn test_reset_opens_a_fresh_session() {
        let (conv, chat) = conversation(ScriptedChat::default());
        conv.send("before").await.unwrap();
        conv.reset().await;
        let reply = conv.send("after").await.unwrap().unwrap();
        assert_eq!(chat.opened.load(Ordering::SeqCst), 2);
        assert!(reply.text.starts_with("session 2 turn 1"));
    }

    #[tokio::test]
    async fn test_reply_arriving_after_reset_is_dropped() {
        let gate = Arc::new(Notify::new());
        let (conv, chat) = conversation(ScriptedChat {
            gate: Some(gate.clone()),
            ..ScriptedChat::default()
        });

        let pending = tokio::spawn({
            let conv = conv.clone();
            async move { conv.send("slow question").await }
        });
        chat.started.notified().await;
        conv.reset().await;
        gate.notify_one();

        assert_eq!(pending.await.unwrap(), Ok(None));
        assert_eq!(conv.view().await.messages.len(), 1);
    }
}
