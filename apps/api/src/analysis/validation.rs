//! Contract checks on a parsed `CareerAnalysis`.
//!
//! Section counts are enforced (a document that breaks them is rejected).
//! Scores and importance labels are only reported: they are shown as the
//! model returned them.

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::warn;

use crate::analysis::models::{CareerAnalysis, SCORE_SCALE_MAX};

pub const SKILL_GAP_COUNT: RangeInclusive<usize> = 5..=6;
pub const ROADMAP_PHASE_COUNT: RangeInclusive<usize> = 3..=4;
pub const RESOURCE_COUNT: usize = 3;

const IMPORTANCE_LEVELS: [&str; 3] = ["High", "Medium", "Low"];

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContractReport {
    /// Hard violations; any entry means the document is rejected.
    pub violations: Vec<String>,
    /// Soft issues, logged and passed through.
    pub warnings: Vec<String>,
}

impl ContractReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn check_contract(analysis: &CareerAnalysis) -> ContractReport {
    let mut report = ContractReport::default();

    let gaps = analysis.skill_gaps.len();
    if !SKILL_GAP_COUNT.contains(&gaps) {
        report.violations.push(format!(
            "expected {}-{} skill gaps, got {gaps}",
            SKILL_GAP_COUNT.start(),
            SKILL_GAP_COUNT.end()
        ));
    }

    let phases = analysis.roadmap.len();
    if !ROADMAP_PHASE_COUNT.contains(&phases) {
        report.violations.push(format!(
            "expected {}-{} roadmap phases, got {phases}",
            ROADMAP_PHASE_COUNT.start(),
            ROADMAP_PHASE_COUNT.end()
        ));
    }

    let resources = analysis.recommended_resources.len();
    if resources != RESOURCE_COUNT {
        report.violations.push(format!(
            "expected exactly {RESOURCE_COUNT} recommended resources, got {resources}"
        ));
    }

    for gap in &analysis.skill_gaps {
        for (label, score) in [("current", gap.current_score), ("target", gap.target_score)] {
            if !(1..=SCORE_SCALE_MAX).contains(&score) {
                report.warnings.push(format!(
                    "skill '{}' has {label} score {score} outside 1-{SCORE_SCALE_MAX}",
                    gap.skill
                ));
            }
        }
        if !IMPORTANCE_LEVELS.contains(&gap.importance.as_str()) {
            report.warnings.push(format!(
                "skill '{}' has unexpected importance '{}'",
                gap.skill, gap.importance
            ));
        }
    }

    for warning in &report.warnings {
        warn!("Analysis contract warning: {warning}");
    }

    report
}


#[cfg(test)]
mod tests {
    use super::fixtures::analysis_with;
    use super::*;

    #[test]
    fn test_valid_counts_pass() {
        for (gaps, phases) in [(5, 3), (6, 4), (5, 4), (6, 3)] {
            let report = check_contract(&analysis_with(gaps, phases, 3));
            assert!(report.passed(), "{gaps} gaps / {phases} phases: {report:?}");
        }
    }

    #[test]
    fn test_skill_gap_count_violations() {
        for gaps in [0, 2, 4, 7] {
            let report = check_contract(&analysis_with(gaps, 3, 3));
            assert!(!report.passed(), "{gaps} gaps should be rejected");
            assert!(report.violations[0].contains("skill gaps"));
        }
    }

    #[test]
    fn test_resource_count_must_be_exactly_three() {
        for resources in [2, 4] {
            assert!(!check_contract(&analysis_with(5, 3, resources)).passed());
        }
    }

    #[test]
    fn test_roadmap_phase_count_violations() {
        assert!(!check_contract(&analysis_with(5, 2, 3)).passed());
        assert!(!check_contract(&analysis_with(5, 5, 3)).passed());
    }

    #[test]
    fn test_out_of_range_scores_and_importance_only_warn() {
        let mut analysis = analysis_with(5, 3, 3);
        analysis.skill_gaps[0].current_score = 0;
        analysis.skill_gaps[1].target_score = 11;
        analysis.skill_gaps[2].importance = "Critical".into();

        let report = check_contract(&analysis);
        assert!(report.passed());
        assert_eq!(report.warnings.len(), 3);
    }
}
