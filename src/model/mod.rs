mod card;
mod color;
mod deck;
mod iteration;
mod plan;
mod quality;
mod request;
mod result;

pub use card::Card;
pub use color::Color;
pub use deck::{Deck, DeckCard};
pub use iteration::{IterationRecord, IterationState};
pub use plan::{
    CardAddition, CardRemoval, CardSelection, ConstructionPlan, EditAction, EditActionType,
    EditPlan, ImprovementPlan,
};
pub use quality::QualityMetrics;
pub use request::{BuildRequest, IntentType, ParsedIntent};
pub use result::{DeckResult, IterationSummary};
