// Extraction gateway prompt and response schema.

use serde_json::Value;

use crate::llm_client::schema::{array, integer, object, string};

/// Upper bound on extracted skills.
pub const MAX_EXTRACTED_SKILLS: usize = 15;

pub const CV_EXTRACTION_PROMPT: &str = r#"Analyze this CV/Resume and extract the user's professional profile.

Return a JSON object with:
- name: Full name
- currentRole: Most recent job title found in experience
- yearsExperience: Estimate total years of professional experience based on the timeline, as a whole number
- skills: List of top technical and soft skills (max 15), most important first
- bio: A brief professional summary (2-3 sentences) based on their background
- targetRole: Infer a logical next career step (e.g. if Senior Dev, target Lead Dev). If unclear, return an empty string.

Only use information present in the document."#;

/// Response schema matching `PartialProfile`.
pub fn extraction_schema() -> Value {
    object(&[
        ("name", string()),
        ("currentRole", string()),
        ("yearsExperience", integer()),
        ("targetRole", string()),
        ("skills", array(string())),
        ("bio", string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_field_types() {
        let schema = extraction_schema();
        let props = &schema["properties"];
        assert_eq!(props["name"]["type"], "STRING");
        assert_eq!(props["currentRole"]["type"], "STRING");
        assert_eq!(props["yearsExperience"]["type"], "INTEGER");
        assert_eq!(props["skills"]["type"], "ARRAY");
        assert_eq!(props["skills"]["items"]["type"], "STRING");
        assert_eq!(props["bio"]["type"], "STRING");
        assert_eq!(props["targetRole"]["type"], "STRING");
    }

    #[test]
    fn test_prompt_mentions_skill_cap() {
        assert!(CV_EXTRACTION_PROMPT.contains("max 15"));
    }
}
