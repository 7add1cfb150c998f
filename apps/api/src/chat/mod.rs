// Consultant chat: grounding prompt, session seam, and the visible transcript.
// Chat failures are absorbed into the transcript and never become AppErrors.

pub mod conversation;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod session;

pub use conversation::{Conversation, SendError};
