use serde::{Deserialize, Serialize};

use super::deck::Deck;
use super::quality::QualityMetrics;

/// A single Build-or-Refine-then-Verify cycle, captured for the caller's
/// inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub deck_snapshot: Deck,
    pub quality_metrics: QualityMetrics,
}

/// Tracks iteration budget and convergence across a single request's
/// lifetime. `iteration_count` increments at the entry of both the Build and
/// Refine node, so it counts total builder invocations, not Verify passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationState {
    pub iteration_count: u32,
    pub max_iterations: u32,
    pub quality_threshold: f64,
    pub history: Vec<IterationRecord>,
}

impl IterationState {
    pub fn new(max_iterations: u32, quality_threshold: f64) -> Self {
        Self {
            iteration_count: 0,
            max_iterations,
            quality_threshold,
            history: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: IterationRecord) {
        self.history.push(record);
    }

    /// True when the budget allows another Refine pass and the latest score
    /// hasn't met the threshold yet.
    pub fn should_continue(&self, latest_overall: f64) -> bool {
        self.iteration_count < self.max_iterations && latest_overall < self.quality_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_once_threshold_met() {
        let state = IterationState::new(5, 0.7);
        assert!(!state.should_continue(0.9));
        assert!(state.should_continue(0.5));
    }

    #[test]
    fn stops_once_budget_exhausted() {
        let mut state = IterationState::new(2, 0.7);
        state.iteration_count = 2;
        assert!(!state.should_continue(0.1));
    }
}
