use std::sync::Arc;

use crate::error::OrchestratorError;
use crate::executor::PlanExecutor;
use crate::model::{BuildRequest, Deck, ImprovementPlan};
use crate::prompt;
use crate::repository::CardRepository;

use super::model::DeckBuilderModel;
use super::tool::RepositorySearchTool;

/// Owns one model call plus the Plan Executor invocation that turns its
/// output into a deck. Mirrors the combined plan-then-execute
/// responsibility the system this is grounded on gives its deck-builder
/// service, rather than splitting planning and execution across two public
/// entry points.
pub struct DeckBuilderAgent {
    model: Box<dyn DeckBuilderModel>,
    repository: Arc<CardRepository>,
}

impl DeckBuilderAgent {
    pub fn new(model: Box<dyn DeckBuilderModel>, repository: Arc<CardRepository>) -> Self {
        Self { model, repository }
    }

    /// Build mode: ask the model for a construction plan, then execute it.
    /// If the model call fails outright, the Plan Executor's deterministic
    /// fallback (basic lands only) still produces a legal deck rather than
    /// propagating the failure.
    pub async fn build_initial_deck(&self, request: &BuildRequest) -> Result<Deck, OrchestratorError> {
        request
            .validate()
            .map_err(OrchestratorError::InvalidRequest)?;

        let system_prompt = prompt::build_builder_prompt(&request.format, &request.archetype)?;
        let user_prompt = format!(
            "Build a {} {} deck in colors {:?}.{}",
            request.format,
            request.archetype,
            request.colors,
            if request.strategy.is_empty() {
                String::new()
            } else {
                format!(" Strategy: {}", request.strategy)
            }
        );
        let tool = RepositorySearchTool::new(self.repository.clone(), request.format.clone());

        let plan = match self.model.build_plan(&system_prompt, &user_prompt, &tool).await {
            Ok(plan) => Some(plan),
            Err(e) => {
                tracing::warn!(model = self.model.name(), error = %e, "build_plan failed, falling back to minimal deck");
                None
            }
        };

        PlanExecutor::build(&self.repository, request, plan).await
    }

    /// Refine mode: ask the model for an edit plan addressing the given
    /// quality feedback, then execute it. If the model call fails, the deck
    /// is returned unchanged rather than forced through a fallback
    /// construction, since a refine failure means "could not improve it
    /// this iteration", not "no deck exists yet". Also returns a
    /// human-readable description of each action actually applied, empty
    /// when the model call failed and nothing changed.
    pub async fn refine_deck(
        &self,
        deck: Deck,
        request: &BuildRequest,
        suggestions: &[String],
        improvement_plan: Option<&ImprovementPlan>,
    ) -> Result<(Deck, Vec<String>), OrchestratorError> {
        let system_prompt = prompt::build_refiner_prompt(&request.format, &request.archetype)?;
        let user_prompt = build_refine_user_prompt(suggestions, improvement_plan);
        let tool = RepositorySearchTool::new(self.repository.clone(), request.format.clone());

        match self.model.refine_plan(&system_prompt, &user_prompt, &tool).await {
            Ok(plan) => {
                let applied = describe_actions(&plan);
                let deck = PlanExecutor::refine(&self.repository, request, deck, plan).await?;
                Ok((deck, applied))
            }
            Err(e) => {
                tracing::warn!(model = self.model.name(), error = %e, "refine_plan failed, keeping deck unchanged");
                Ok((deck, Vec::new()))
            }
        }
    }
}

fn describe_actions(plan: &crate::model::EditPlan) -> Vec<String> {
    plan.actions
        .iter()
        .map(|action| match action.action_type {
            crate::model::EditActionType::Add => {
                format!("added {}x {}", action.quantity, action.card_name)
            }
            crate::model::EditActionType::Remove => {
                format!("removed {}x {}", action.quantity, action.card_name)
            }
        })
        .collect()
}

fn build_refine_user_prompt(suggestions: &[String], improvement_plan: Option<&ImprovementPlan>) -> String {
    let mut prompt = String::from("Quality issues identified:\n");
    for s in suggestions {
        prompt.push_str("- ");
        prompt.push_str(s);
        prompt.push('\n');
    }

    if let Some(plan) = improvement_plan {
        prompt.push_str(&format!("\nProposed analysis: {}\n", plan.analysis));
        for removal in &plan.removals {
            prompt.push_str(&format!(
                "Consider removing {}x {}: {}\n",
                removal.quantity, removal.card_name, removal.reason
            ));
        }
        for addition in &plan.additions {
            prompt.push_str(&format!(
                "Consider adding {}x {}: {}\n",
                addition.quantity, addition.card_name, addition.reason
            ));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::model::StubDeckBuilderModel;
    use crate::model::Color;
    use crate::store::SqliteCardStore;
    use crate::vector::DisabledVectorStore;

    fn request() -> BuildRequest {
        BuildRequest {
            format: "Standard".to_string(),
            colors: vec!["R".to_string()],
            archetype: "Aggro".to_string(),
            strategy: String::new(),
            deck_size: 0,
            quality_threshold: 0.7,
            max_iterations: 5,
        }
    }

    fn repository() -> Arc<CardRepository> {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        Arc::new(CardRepository::new(store, Arc::new(DisabledVectorStore), 100))
    }

    #[tokio::test]
    async fn build_initial_deck_falls_back_to_minimal_deck_when_model_fails() {
        let agent = DeckBuilderAgent::new(
            Box::new(StubDeckBuilderModel::failing()),
            repository(),
        );
        let deck = agent.build_initial_deck(&request()).await.unwrap();
        assert_eq!(deck.total_cards, 60);
        assert_eq!(deck.cards[0].card.name, "Mountain");
    }

    #[tokio::test]
    async fn build_initial_deck_uses_model_plan_when_it_succeeds() {
        let agent = DeckBuilderAgent::new(Box::new(StubDeckBuilderModel::new()), repository());
        let deck = agent.build_initial_deck(&request()).await.unwrap();
        assert_eq!(deck.total_cards, 60);
    }

    #[tokio::test]
    async fn refine_deck_keeps_deck_unchanged_when_model_fails() {
        let agent = DeckBuilderAgent::new(Box::new(StubDeckBuilderModel::failing()), repository());
        let mut deck = Deck::new("Standard", "Aggro", vec!["R".to_string()]);
        deck.cards.push(crate::model::DeckCard::new(
            crate::model::Card::basic_land(Color::Red),
            60,
        ));
        deck.recalculate_totals();

        let (result, applied) = agent
            .refine_deck(deck.clone(), &request(), &["too many lands".to_string()], None)
            .await
            .unwrap();
        assert_eq!(result.total_cards, deck.total_cards);
        assert!(applied.is_empty());
    }
}
