use serde::{Deserialize, Serialize};

use super::deck::Deck;
use super::quality::QualityMetrics;

/// One row of the caller-facing iteration history: just enough to chart
/// convergence without re-serializing the full deck per iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationSummary {
    pub iteration: u32,
    pub quality_score: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// The shape every entry point (`build_new_deck`, `modify_deck`) returns.
/// `modifications` is only populated by `modify_deck` -- a human-readable
/// summary of the edit actions that were actually applied; `build_new_deck`
/// leaves it empty since there's no prior deck for it to describe a change
/// against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckResult {
    pub success: bool,
    pub deck: Option<Deck>,
    pub quality: Option<QualityMetrics>,
    pub iteration_count: u32,
    pub iteration_history: Vec<IterationSummary>,
    pub error: Option<String>,
    pub modifications: Vec<String>,
}

impl DeckResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            deck: None,
            quality: None,
            iteration_count: 0,
            iteration_history: Vec::new(),
            error: Some(error.into()),
            modifications: Vec::new(),
        }
    }
}
