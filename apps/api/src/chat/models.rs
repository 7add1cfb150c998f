use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Unix milliseconds; never decreases within a transcript.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
}
