use serde::{Deserialize, Serialize};

/// Upper end of the proficiency scale used in skill gaps and the chart.
pub const SCORE_SCALE_MAX: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub skill: String,
    /// Nominally 1–10; passed through as the model returned it.
    pub current_score: i32,
    pub target_score: i32,
    /// Nominally High / Medium / Low.
    pub importance: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStep {
    pub phase: String,
    pub title: String,
    pub description: String,
    pub duration: String,
}

/// Structured career plan returned by the analysis call. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerAnalysis {
    pub executive_summary: String,
    pub skill_gaps: Vec<SkillGap>,
    pub roadmap: Vec<RoadmapStep>,
    pub salary_insights: String,
    pub recommended_resources: Vec<String>,
}

/// One axis of the current-vs-target skill radar on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapChartPoint {
    pub subject: String,
    pub current: i32,
    pub target: i32,
    pub full_mark: i32,
}

impl CareerAnalysis {
    pub fn chart_points(&self) -> Vec<SkillGapChartPoint> {
        self.skill_gaps
            .iter()
            .map(|gap| SkillGapChartPoint {
                subject: gap.skill.clone(),
                current: gap.current_score,
                target: gap.target_score,
                full_mark: SCORE_SCALE_MAX,
            })
            .collect()
    }
}
