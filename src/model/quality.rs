use serde::{Deserialize, Serialize};

use super::plan::ImprovementPlan;

/// The four deterministic dimensions the Quality Verifier scores, plus the
/// weighted overall and the rule-based issues/suggestions derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub mana_curve: f64,
    pub land_ratio: f64,
    pub synergy: f64,
    pub consistency: f64,
    pub overall_score: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub improvement_plan: Option<ImprovementPlan>,
}

/// The constant weights applied to the four subscores. Unjustified in the
/// system this was derived from; retained as named constants rather than
/// re-tuned, per the Quality Verifier's open question.
pub const WEIGHT_MANA_CURVE: f64 = 0.30;
pub const WEIGHT_LAND_RATIO: f64 = 0.25;
pub const WEIGHT_SYNERGY: f64 = 0.25;
pub const WEIGHT_CONSISTENCY: f64 = 0.20;

impl QualityMetrics {
    pub fn new(mana_curve: f64, land_ratio: f64, synergy: f64, consistency: f64) -> Self {
        let overall_score = WEIGHT_MANA_CURVE * mana_curve
            + WEIGHT_LAND_RATIO * land_ratio
            + WEIGHT_SYNERGY * synergy
            + WEIGHT_CONSISTENCY * consistency;

        Self {
            mana_curve,
            land_ratio,
            synergy,
            consistency,
            overall_score,
            issues: Vec::new(),
            suggestions: Vec::new(),
            improvement_plan: None,
        }
    }

    /// Hard-zero the overall score. Must be called last, after the weighted
    /// average is computed, so the zero actually sticks (the Python system
    /// this is grounded on recomputes the weighted average unconditionally
    /// after setting this, silently clobbering it).
    pub fn zero_out_for_size_mismatch(&mut self) {
        self.overall_score = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_weighted_average() {
        let m = QualityMetrics::new(1.0, 1.0, 1.0, 1.0);
        assert!((m.overall_score - 1.0).abs() < 1e-9);

        let m = QualityMetrics::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(m.overall_score, 0.0);
    }

    #[test]
    fn zero_out_wins_over_weighted_average() {
        let mut m = QualityMetrics::new(1.0, 1.0, 1.0, 1.0);
        m.zero_out_for_size_mismatch();
        assert_eq!(m.overall_score, 0.0);
    }
}
