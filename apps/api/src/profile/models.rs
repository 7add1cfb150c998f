use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Long-term track the user wants the roadmap tailored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CareerPath {
    #[default]
    #[serde(rename = "Technical Expert")]
    TechnicalExpert,
    #[serde(rename = "Management")]
    Management,
    #[serde(rename = "Entrepreneurial")]
    Entrepreneurial,
}

impl CareerPath {
    pub const ALL: [CareerPath; 3] = [
        CareerPath::TechnicalExpert,
        CareerPath::Management,
        CareerPath::Entrepreneurial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CareerPath::TechnicalExpert => "Technical Expert",
            CareerPath::Management => "Management",
            CareerPath::Entrepreneurial => "Entrepreneurial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningStyle {
    #[serde(rename = "Video Courses")]
    VideoCourses,
    #[serde(rename = "Reading/Books")]
    ReadingBooks,
    #[serde(rename = "Hands-on Projects")]
    HandsOnProjects,
    #[serde(rename = "Mentorship")]
    Mentorship,
}

impl LearningStyle {
    pub const ALL: [LearningStyle; 4] = [
        LearningStyle::VideoCourses,
        LearningStyle::ReadingBooks,
        LearningStyle::HandsOnProjects,
        LearningStyle::Mentorship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::VideoCourses => "Video Courses",
            LearningStyle::ReadingBooks => "Reading/Books",
            LearningStyle::HandsOnProjects => "Hands-on Projects",
            LearningStyle::Mentorship => "Mentorship",
        }
    }
}

/// Weekly hours the user can put into the roadmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeCommitment {
    #[serde(rename = "Casual (< 3h)")]
    Casual,
    #[default]
    #[serde(rename = "Moderate (3-7h)")]
    Moderate,
    #[serde(rename = "Intensive (7+h)")]
    Intensive,
}

impl TimeCommitment {
    pub const ALL: [TimeCommitment; 3] = [
        TimeCommitment::Casual,
        TimeCommitment::Moderate,
        TimeCommitment::Intensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeCommitment::Casual => "Casual (< 3h)",
            TimeCommitment::Moderate => "Moderate (3-7h)",
            TimeCommitment::Intensive => "Intensive (7+h)",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(CareerPath, LearningStyle, TimeCommitment);

/// The user's career data collected during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub current_role: String,
    pub years_experience: u32,
    pub target_role: String,
    /// Display order; duplicates allowed.
    pub skills: Vec<String>,
    /// Free-text goals ("What are your goals?").
    pub bio: String,
    pub career_path: CareerPath,
    pub learning_styles: Vec<LearningStyle>,
    pub time_commitment: TimeCommitment,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            current_role: String::new(),
            years_experience: 0,
            target_role: String::new(),
            skills: Vec::new(),
            bio: String::new(),
            career_path: CareerPath::default(),
            learning_styles: vec![LearningStyle::HandsOnProjects],
            time_commitment: TimeCommitment::default(),
        }
    }
}

impl Profile {
    /// Appends a trimmed skill. Returns `false` (and changes nothing) for blank input.
    pub fn add_skill(&mut self, input: &str) -> bool {
        let skill = input.trim();
        if skill.is_empty() {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    /// Removes every skill equal to `skill`. Returns how many were removed.
    pub fn remove_skill(&mut self, skill: &str) -> usize {
        let before = self.skills.len();
        self.skills.retain(|s| s != skill);
        before - self.skills.len()
    }

    /// Adds the style if absent, removes it if present.
    /// Returns whether the style is selected afterwards.
    pub fn toggle_learning_style(&mut self, style: LearningStyle) -> bool {
        if self.learning_styles.contains(&style) {
            self.learning_styles.retain(|s| *s != style);
            false
        } else {
            self.learning_styles.push(style);
            true
        }
    }

    pub fn learning_style_labels(&self) -> Vec<&'static str> {
        self.learning_styles.iter().map(|s| s.as_str()).collect()
    }
}

/// Subset of `Profile` fields returned by CV extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Coerces user-entered experience into a non-negative integer.
///
/// Accepts JSON numbers (truncated) and strings with a leading integer
/// (`"5 years"` → 5). Anything unparseable, negative or of another JSON type → 0.
pub fn coerce_years(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                clamp_years(i)
            } else if let Some(u) = n.as_u64() {
                u32::try_from(u).unwrap_or(u32::MAX)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f > 0.0)
                    .map(|f| f.trunc().min(u32::MAX as f64) as u32)
                    .unwrap_or(0)
            }
        }
        Value::String(s) => parse_leading_integer(s),
        _ => 0,
    }
}

pub(crate) fn clamp_years(years: i64) -> u32 {
    if years <= 0 {
        0
    } else {
        u32::try_from(years).unwrap_or(u32::MAX)
    }
}

fn parse_leading_integer(input: &str) -> u32 {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() || negative {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}
