use serde::{Deserialize, Serialize};

/// One card the Deck Builder Agent wants included in the deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSelection {
    pub card_name: String,
    pub quantity: u32,
    pub reasoning: String,
}

/// The agent's output in build mode: a strategy note plus spell selections.
/// Lands are never part of a construction plan; the Executor adds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionPlan {
    pub strategy: String,
    pub card_selections: Vec<CardSelection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditActionType {
    Add,
    Remove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditAction {
    pub action_type: EditActionType,
    pub card_name: String,
    pub quantity: u32,
    pub reasoning: String,
}

/// The agent's output in refine mode: an analysis note plus a sequence of
/// add/remove actions sized to hit the target deck size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPlan {
    pub analysis: String,
    pub actions: Vec<EditAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardAddition {
    pub card_name: String,
    pub quantity: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRemoval {
    pub card_name: String,
    pub quantity: u32,
    pub reason: String,
}

/// Structured output of the Quality Verifier's optional LLM analysis step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImprovementPlan {
    pub analysis: String,
    pub removals: Vec<CardRemoval>,
    pub additions: Vec<CardAddition>,
}
