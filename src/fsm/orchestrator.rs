use crate::agent::DeckBuilderAgent;
use crate::intent::IntentParser;
use crate::model::{BuildRequest, Deck, DeckResult, IterationRecord, IterationState, IterationSummary};
use crate::prompt;
use crate::verifier::{propose_improvements, ImprovementAdvisor, QualityVerifier};

/// The nodes of the Build-or-Refine-then-Verify graph, kept only for
/// tracing: `build_new_deck` and `modify_deck` are plain control flow, but
/// every phase transition is logged under the node name it corresponds to.
#[derive(Debug, Clone, Copy)]
enum FsmNode {
    ParseRequest,
    BuildInitial,
    Verify,
    Refine,
    UserModification,
    End,
}

impl FsmNode {
    fn label(&self) -> &'static str {
        match self {
            FsmNode::ParseRequest => "parse_request",
            FsmNode::BuildInitial => "build_initial",
            FsmNode::Verify => "verify",
            FsmNode::Refine => "refine",
            FsmNode::UserModification => "user_modification",
            FsmNode::End => "end",
        }
    }
}

fn enter(node: FsmNode) {
    tracing::debug!(node = node.label(), "entering fsm node");
}

/// Drives one request from parsing through build/refine/verify to a final
/// `DeckResult`. Owns the Deck Builder Agent and the (optional) LLM
/// improvement advisor; the Card Repository and model implementations are
/// supplied when the agent itself is constructed.
pub struct Orchestrator {
    agent: DeckBuilderAgent,
    advisor: Box<dyn ImprovementAdvisor>,
}

impl Orchestrator {
    pub fn new(agent: DeckBuilderAgent, advisor: Box<dyn ImprovementAdvisor>) -> Self {
        Self { agent, advisor }
    }

    /// ParseRequest -> BuildInitial -> Verify -> {Refine -> Verify}* -> End.
    pub async fn build_new_deck(&self, request: BuildRequest) -> DeckResult {
        enter(FsmNode::ParseRequest);
        if let Err(e) = request.validate() {
            return DeckResult::failure(e);
        }

        let mut state = IterationState::new(request.max_iterations, request.quality_threshold);

        enter(FsmNode::BuildInitial);
        state.iteration_count += 1;
        // No deck exists yet at this point, so even a non-terminal error
        // (is_terminal() == false) has nothing to fall back to and still
        // ends the request -- unlike the refine loop below, which can keep
        // the deck already on hand.
        let mut deck = match self.agent.build_initial_deck(&request).await {
            Ok(deck) => deck,
            Err(e) => return DeckResult::failure(e.to_string()),
        };

        enter(FsmNode::Verify);
        let mut metrics = match QualityVerifier::verify(&deck, &request) {
            Ok(m) => m,
            Err(e) => return DeckResult::failure(e.to_string()),
        };

        let mut history = vec![summarize(state.iteration_count, &metrics)];
        state.add_record(IterationRecord {
            iteration: state.iteration_count,
            deck_snapshot: deck.clone(),
            quality_metrics: metrics.clone(),
        });

        while state.should_continue(metrics.overall_score) {
            enter(FsmNode::Refine);
            state.iteration_count += 1;

            let improvement_plan = match prompt::build_verifier_prompt(&request.format) {
                Ok(system_prompt) => {
                    let user_prompt = metrics.suggestions.join("; ");
                    propose_improvements(self.advisor.as_ref(), &system_prompt, &user_prompt).await
                }
                Err(_) => None,
            };

            // A terminal error ends the whole request; a non-terminal one
            // means this particular refine/verify attempt couldn't complete,
            // so the loop stops early and returns the last known-good deck
            // rather than failing a request that already has a legal deck.
            let previous_deck = deck.clone();
            deck = match self
                .agent
                .refine_deck(deck, &request, &metrics.suggestions, improvement_plan.as_ref())
                .await
            {
                Ok((deck, _applied)) => deck,
                Err(e) if e.is_terminal() => return DeckResult::failure(e.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "non-terminal refine error, stopping early with prior deck");
                    break;
                }
            };

            enter(FsmNode::Verify);
            metrics = match QualityVerifier::verify(&deck, &request) {
                Ok(mut m) => {
                    m.improvement_plan = improvement_plan;
                    m
                }
                Err(e) if e.is_terminal() => return DeckResult::failure(e.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "non-terminal verify error, stopping early with prior deck");
                    deck = previous_deck;
                    break;
                }
            };

            history.push(summarize(state.iteration_count, &metrics));
            state.add_record(IterationRecord {
                iteration: state.iteration_count,
                deck_snapshot: deck.clone(),
                quality_metrics: metrics.clone(),
            });
        }

        enter(FsmNode::End);
        DeckResult {
            success: true,
            deck: Some(deck),
            quality: Some(metrics),
            iteration_count: state.iteration_count,
            iteration_history: history,
            error: None,
            modifications: Vec::new(),
        }
    }

    /// Single-shot modification of an existing deck: parse the free-form
    /// prompt's intent, run exactly one Refine pass, and optionally verify
    /// the result. Unlike `build_new_deck` there is no iteration budget —
    /// the caller asked for one specific change, not convergence to a
    /// threshold.
    pub async fn modify_deck(
        &self,
        deck: Deck,
        modification_prompt: &str,
        request: BuildRequest,
        run_quality_check: bool,
    ) -> DeckResult {
        enter(FsmNode::ParseRequest);
        let intent = IntentParser::parse(modification_prompt);

        enter(FsmNode::UserModification);
        let mut suggestions = vec![intent.description.clone()];
        suggestions.extend(intent.constraints.clone());

        // No iteration budget here to fall back within, so any refine error
        // (terminal or not) ends this single-shot request the same way.
        let (refined, applied) = match self.agent.refine_deck(deck, &request, &suggestions, None).await {
            Ok(result) => result,
            Err(e) => return DeckResult::failure(e.to_string()),
        };

        let mut modifications = vec![intent.description.clone()];
        modifications.extend(applied);

        if !run_quality_check {
            enter(FsmNode::End);
            return DeckResult {
                success: true,
                deck: Some(refined),
                quality: None,
                iteration_count: 1,
                iteration_history: Vec::new(),
                error: None,
                modifications,
            };
        }

        enter(FsmNode::Verify);
        let metrics = match QualityVerifier::verify(&refined, &request) {
            Ok(m) => m,
            Err(e) => return DeckResult::failure(e.to_string()),
        };

        enter(FsmNode::End);
        DeckResult {
            success: true,
            iteration_history: vec![summarize(1, &metrics)],
            deck: Some(refined),
            quality: Some(metrics),
            iteration_count: 1,
            error: None,
            modifications,
        }
    }
}

fn summarize(iteration: u32, metrics: &crate::model::QualityMetrics) -> IterationSummary {
    IterationSummary {
        iteration,
        quality_score: metrics.overall_score,
        issues: metrics.issues.clone(),
        suggestions: metrics.suggestions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::StubDeckBuilderModel;
    use crate::repository::CardRepository;
    use crate::store::SqliteCardStore;
    use crate::verifier::StubImprovementAdvisor;
    use crate::vector::DisabledVectorStore;
    use std::sync::Arc;

    fn request() -> BuildRequest {
        BuildRequest {
            format: "Standard".to_string(),
            colors: vec!["R".to_string()],
            archetype: "Aggro".to_string(),
            strategy: String::new(),
            deck_size: 0,
            quality_threshold: 0.0,
            max_iterations: 3,
        }
    }

    fn orchestrator() -> Orchestrator {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        let repo = Arc::new(CardRepository::new(store, Arc::new(DisabledVectorStore), 100));
        let agent = DeckBuilderAgent::new(Box::new(StubDeckBuilderModel::new()), repo);
        Orchestrator::new(agent, Box::new(StubImprovementAdvisor::new()))
    }

    #[tokio::test]
    async fn build_new_deck_stops_as_soon_as_threshold_is_met() {
        let result = orchestrator().build_new_deck(request()).await;
        assert!(result.success);
        assert_eq!(result.iteration_count, 1);
        assert_eq!(result.deck.unwrap().total_cards, 60);
    }

    #[tokio::test]
    async fn invalid_request_fails_without_touching_the_agent() {
        let mut req = request();
        req.colors.clear();
        let result = orchestrator().build_new_deck(req).await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn modify_deck_runs_a_single_refine_pass() {
        let deck = orchestrator().build_new_deck(request()).await.deck.unwrap();
        let result = orchestrator()
            .modify_deck(deck, "add more removal spells", request(), true)
            .await;
        assert!(result.success);
        assert_eq!(result.iteration_count, 1);
        assert_eq!(result.modifications[0], "add more removal spells");
    }

    #[tokio::test]
    async fn build_new_deck_leaves_modifications_empty() {
        let result = orchestrator().build_new_deck(request()).await;
        assert!(result.modifications.is_empty());
    }
}
