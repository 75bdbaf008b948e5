use async_trait::async_trait;

use crate::model::{ConstructionPlan, EditPlan};

use super::tool::{SearchCardsArgs, SearchCardsResult};

/// Error type for Deck Builder Agent model calls, matching the
/// retryable/not-retryable convention used for every outbound client.
#[derive(Debug, Clone)]
pub struct AgentError {
    pub message: String,
    pub is_retryable: bool,
}

impl AgentError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_retryable: true,
        }
    }

    pub fn not_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_retryable: false,
        }
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AgentError {}

/// A tool the model can call mid-conversation to look up candidate cards.
/// One implementor (`RepositorySearchTool`) backs every real invocation;
/// tests can swap in a fixed-response stub.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search_cards(&self, args: SearchCardsArgs) -> SearchCardsResult;
}

/// The structured-output contract the Deck Builder Agent drives: given a
/// system prompt, a user prompt, and a tool it may call, produce either a
/// construction plan (build mode) or an edit plan (refine mode). Mirrors the
/// provider-swap seam an `LlmClient` trait would provide, generalized to two
/// structured-output shapes instead of one.
#[async_trait]
pub trait DeckBuilderModel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn build_plan(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tool: &dyn SearchTool,
    ) -> Result<ConstructionPlan, AgentError>;

    async fn refine_plan(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tool: &dyn SearchTool,
    ) -> Result<EditPlan, AgentError>;
}

/// A deterministic stand-in for a real provider, used by tests and the demo
/// binary. Issues one tool call to sanity-check the plumbing, then returns a
/// fixed plan (or an error, when configured to fail) regardless of prompt
/// content.
pub struct StubDeckBuilderModel {
    pub should_fail: bool,
}

impl StubDeckBuilderModel {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for StubDeckBuilderModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeckBuilderModel for StubDeckBuilderModel {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn build_plan(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        tool: &dyn SearchTool,
    ) -> Result<ConstructionPlan, AgentError> {
        if self.should_fail {
            return Err(AgentError::not_retryable("stub model configured to fail"));
        }

        let found = tool
            .search_cards(SearchCardsArgs {
                semantic_query: Some("efficient creature".to_string()),
                ..SearchCardsArgs::default()
            })
            .await;

        let card_selections = found
            .cards
            .into_iter()
            .map(|c| crate::model::CardSelection {
                card_name: c.name,
                quantity: 4,
                reasoning: "stub selection".to_string(),
            })
            .collect();

        Ok(ConstructionPlan {
            strategy: "stub strategy: curve out with efficient threats".to_string(),
            card_selections,
        })
    }

    async fn refine_plan(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _tool: &dyn SearchTool,
    ) -> Result<EditPlan, AgentError> {
        if self.should_fail {
            return Err(AgentError::not_retryable("stub model configured to fail"));
        }

        Ok(EditPlan {
            analysis: "stub analysis: no changes needed".to_string(),
            actions: vec![],
        })
    }
}
