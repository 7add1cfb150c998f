// Analysis gateway prompt template and response schema.

use serde_json::Value;

use crate::llm_client::prompts::{fill, join_list};
use crate::llm_client::schema::{array, described, integer, object, string};
use crate::profile::models::Profile;

pub const ANALYSIS_SYSTEM: &str = "You are a world-class Senior Career Consultant. \
    You produce honest, specific, actionable career growth plans. \
    You MUST respond with valid JSON only, matching the response schema exactly.";

/// Replace every `{placeholder}` via `build_analysis_prompt`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following user profile and provide a detailed career growth plan.

User Profile:
Name: {name}
Current Role: {current_role}
Years of Experience: {years_experience}
Target Role: {target_role}
Skills: {skills}
Goals/Bio: {bio}

User Preferences & Constraints:
- Preferred Career Path: {career_path} (Tailor the roadmap to this track: e.g. Technical vs Management)
- Learning Style: {learning_styles} (Recommend resources that match this style)
- Weekly Time Commitment: {time_commitment} (Ensure the roadmap duration and intensity fits this schedule)

Provide:
1. An executive summary of their current standing vs target, acknowledging their preferred path.
2. A skill gap analysis for their top 5-6 relevant skills: rate current and target proficiency on a 1-10 scale, tag importance as High, Medium or Low, and give one actionable recommendation each.
3. A concrete roadmap with 3-4 distinct, ordered phases, each with a phase label, title, description and estimated duration.
4. Salary insights (general market trends for the jump).
5. Exactly 3 specific learning resources or certifications matching their learning style."#;

pub fn build_analysis_prompt(profile: &Profile) -> String {
    let years = profile.years_experience.to_string();
    let skills = join_list(&profile.skills);
    let learning_styles = join_list(&profile.learning_style_labels());

    fill(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("name", profile.name.as_str()),
            ("current_role", profile.current_role.as_str()),
            ("years_experience", years.as_str()),
            ("target_role", profile.target_role.as_str()),
            ("skills", skills.as_str()),
            ("bio", profile.bio.as_str()),
            ("career_path", profile.career_path.as_str()),
            ("learning_styles", learning_styles.as_str()),
            ("time_commitment", profile.time_commitment.as_str()),
        ],
    )
}

/// Response schema matching `CareerAnalysis`.
pub fn analysis_schema() -> Value {
    let skill_gap = object(&[
        ("skill", string()),
        ("currentScore", described(integer(), "1-10 scale")),
        ("targetScore", described(integer(), "1-10 scale")),
        ("importance", described(string(), "High, Medium, or Low")),
        ("recommendation", described(string(), "Actionable tip to improve")),
    ]);
    let roadmap_step = object(&[
        ("phase", described(string(), "e.g. 'Immediate Actions' or 'Phase 1'")),
        ("title", string()),
        ("description", string()),
        ("duration", described(string(), "e.g. '1-3 months'")),
    ]);

    object(&[
        ("executiveSummary", string()),
        ("skillGaps", array(skill_gap)),
        ("roadmap", array(roadmap_step)),
        ("salaryInsights", string()),
        ("recommendedResources", array(string())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{CareerPath, LearningStyle, TimeCommitment};

    #[test]
    fn test_prompt_embeds_every_profile_field() {
        let profile = Profile {
            name: "Jane".into(),
            current_role: "Engineer".into(),
            years_experience: 3,
            target_role: "Lead Engineer".into(),
            skills: vec!["Go".into(), "Python".into()],
            bio: "Wants to lead a platform team.".into(),
            career_path: CareerPath::Management,
            learning_styles: vec![LearningStyle::Mentorship, LearningStyle::VideoCourses],
            time_commitment: TimeCommitment::Intensive,
        };
        let prompt = build_analysis_prompt(&profile);

        assert!(prompt.contains("Name: Jane"));
        assert!(prompt.contains("Current Role: Engineer"));
        assert!(prompt.contains("Years of Experience: 3"));
        assert!(prompt.contains("Target Role: Lead Engineer"));
        assert!(prompt.contains("Skills: Go, Python"));
        assert!(prompt.contains("Goals/Bio: Wants to lead a platform team."));
        assert!(prompt.contains("Preferred Career Path: Management"));
        assert!(prompt.contains("Learning Style: Mentorship, Video Courses"));
        assert!(prompt.contains("Weekly Time Commitment: Intensive (7+h)"));
        assert!(!prompt.contains('{'), "unfilled placeholder in prompt");
    }

    #[test]
    fn test_bio_with_braces_reaches_prompt_unchanged() {
        let profile = Profile {
            name: "Jane".into(),
            bio: "Mentor for {career_path} folks, see {time_commitment}".into(),
            career_path: CareerPath::TechnicalExpert,
            ..Profile::default()
        };
        let prompt = build_analysis_prompt(&profile);
        assert!(prompt.contains("Goals/Bio: Mentor for {career_path} folks, see {time_commitment}"));
        assert!(prompt.contains("Preferred Career Path: Technical Expert"));
    }

    #[test]
    fn test_schema_shape() {
        let schema = analysis_schema();
        let props = &schema["properties"];
        assert_eq!(props["skillGaps"]["items"]["properties"]["currentScore"]["type"], "INTEGER");
        assert_eq!(props["roadmap"]["items"]["properties"]["duration"]["type"], "STRING");
        assert_eq!(props["recommendedResources"]["items"]["type"], "STRING");
        assert_eq!(props["salaryInsights"]["type"], "STRING");
    }
}
