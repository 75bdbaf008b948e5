mod deck_builder_agent;
mod model;
mod tool;

pub use deck_builder_agent::DeckBuilderAgent;
pub use model::{AgentError, DeckBuilderModel, SearchTool, StubDeckBuilderModel};
pub use tool::{CardSummary, RepositorySearchTool, SearchCardsArgs, SearchCardsResult};
