use serde::Deserialize;
use serde_json::Value;

use crate::profile::models::{coerce_years, CareerPath, LearningStyle, Profile, TimeCommitment};

/// Partial edit of the form fields. Absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub current_role: Option<String>,
    /// Raw form input; coerced to a non-negative integer.
    pub years_experience: Option<Value>,
    pub target_role: Option<String>,
    pub bio: Option<String>,
    pub career_path: Option<CareerPath>,
    pub time_commitment: Option<TimeCommitment>,
}

impl ProfileUpdate {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(current_role) = self.current_role {
            profile.current_role = current_role;
        }
        if let Some(years) = self.years_experience {
            profile.years_experience = coerce_years(&years);
        }
        if let Some(target_role) = self.target_role {
            profile.target_role = target_role;
        }
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(career_path) = self.career_path {
            profile.career_path = career_path;
        }
        if let Some(time_commitment) = self.time_commitment {
            profile.time_commitment = time_commitment;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SkillInput {
    pub skill: String,
}

#[derive(Debug, Deserialize)]
pub struct LearningStyleInput {
    pub style: LearningStyle,
}
