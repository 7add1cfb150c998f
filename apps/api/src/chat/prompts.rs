// Chat prompts and the fixed user-visible strings of the consultant chat.

use crate::llm_client::prompts::{fill, join_list};
use crate::profile::models::Profile;

pub const CHAT_SYSTEM_TEMPLATE: &str = r#"You are a supportive and knowledgeable Career Consultant helping {name}.

Context:
- Current Role: {current_role}
- Target Role: {target_role}
- Skills: {skills}
- Preferred Path: {career_path}

Keep answers concise, motivating, and actionable.
Focus on the user's growth towards their target role."#;

pub const GREETING_TEMPLATE: &str = "Hi {name}! I've analyzed your profile. \
I'm ready to help you navigate from {current_role} to {target_role}. What's on your mind?";

/// Shown in place of a reply whenever a chat turn fails.
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting right now. Please try again.";

pub fn build_chat_system(profile: &Profile) -> String {
    let skills = join_list(&profile.skills);
    fill(
        CHAT_SYSTEM_TEMPLATE,
        &[
            ("name", profile.name.as_str()),
            ("current_role", profile.current_role.as_str()),
            ("target_role", profile.target_role.as_str()),
            ("skills", skills.as_str()),
            ("career_path", profile.career_path.as_str()),
        ],
    )
}

pub fn build_greeting(profile: &Profile) -> String {
    fill(
        GREETING_TEMPLATE,
        &[
            ("name", profile.name.as_str()),
            ("current_role", profile.current_role.as_str()),
            ("target_role", profile.target_role.as_str()),
        ],
    )
}
