use crate::error::OrchestratorError;
use crate::format::FormatRules;
use crate::model::{
    BuildRequest, Card, ConstructionPlan, Deck, DeckCard, EditActionType, EditPlan,
};
use crate::model::Color;
use crate::repository::CardRepository;
use crate::store::SearchFilters;

/// Deterministic code that turns an agent's plan into a concrete, legal
/// deck. Agents never touch the deck directly; this is the only component
/// that mutates one.
pub struct PlanExecutor;

fn resolve_target_size(request: &BuildRequest) -> Result<u32, OrchestratorError> {
    if request.deck_size > 0 {
        Ok(request.deck_size)
    } else {
        FormatRules::get_deck_size(&request.format)
    }
}

/// Splits `land_count` basic lands across `colors`, giving the first
/// `land_count % colors.len()` colors one extra so every land is placed
/// (no under-fill from integer division, unlike the fallback path this
/// replaces in the system this was grounded on).
fn distribute_lands(colors: &[String], land_count: u32) -> Vec<DeckCard> {
    if colors.is_empty() {
        return vec![DeckCard::new(Card::basic_land(Color::Colorless), land_count)];
    }

    let n = colors.len() as u32;
    let per_color = land_count / n;
    let remainder = land_count % n;

    colors
        .iter()
        .enumerate()
        .filter_map(|(i, symbol)| {
            let quantity = per_color + if (i as u32) < remainder { 1 } else { 0 };
            if quantity == 0 {
                return None;
            }
            let color = Color::from_symbol(symbol).unwrap_or(Color::Colorless);
            Some(DeckCard::new(Card::basic_land(color), quantity))
        })
        .collect()
}

fn validate_quantities(deck: &mut Deck, format: &str) -> Result<(), OrchestratorError> {
    let singleton = FormatRules::is_singleton(format)?;
    let copy_limit = FormatRules::get_copy_limit(format)?;
    let legendary_max = FormatRules::get_legendary_max(format)?;

    for dc in deck.cards.iter_mut() {
        if dc.card.is_basic_land() {
            continue;
        }
        if singleton {
            dc.quantity = dc.quantity.min(1);
        } else if dc.card.is_legendary() {
            dc.quantity = dc.quantity.min(legendary_max);
        } else {
            dc.quantity = dc.quantity.min(copy_limit);
        }
    }
    Ok(())
}

async fn add_filler_cards(
    repo: &CardRepository,
    deck: &mut Deck,
    needed: u32,
    request: &BuildRequest,
) -> Result<(), OrchestratorError> {
    if needed == 0 || request.colors.is_empty() {
        return Ok(());
    }

    let copy_limit = FormatRules::get_copy_limit(&request.format)?;
    let filters = SearchFilters {
        colors: Some(request.colors.clone()),
        types: Some(vec!["Creature".to_string()]),
        cmc_max: Some(3.0),
        format_legal: Some(request.format.clone()),
        limit: 30,
        ..SearchFilters::new()
    };

    // A search failure here is non-terminal: fall through with zero
    // candidates and let the land-padding below (and `force_to_target_size`
    // afterward) make up the shortfall instead of failing the whole build.
    let candidates = match repo.search(&filters).await {
        Ok(cards) => cards,
        Err(e) => {
            tracing::warn!(error = %e, "card search failed while filling remaining slots");
            Vec::new()
        }
    };
    let mut remaining = needed;

    for card in candidates {
        if remaining == 0 {
            break;
        }
        if let Some(existing) = deck.find_by_name_mut(&card.name) {
            let room = copy_limit.saturating_sub(existing.quantity);
            let take = room.min(remaining);
            existing.quantity += take;
            remaining -= take;
        } else {
            let take = copy_limit.min(remaining);
            if take > 0 {
                deck.cards.push(DeckCard::new(card, take));
                remaining -= take;
            }
        }
    }

    if remaining > 0 {
        let color = Color::from_symbol(&request.colors[0]).unwrap_or(Color::Colorless);
        if let Some(land) = deck
            .cards
            .iter_mut()
            .find(|dc| dc.card.is_basic_land())
        {
            land.quantity += remaining;
        } else {
            deck.cards.push(DeckCard::new(Card::basic_land(color), remaining));
        }
    }

    deck.recalculate_totals();
    Ok(())
}

/// Last-resort size correction applied after everything else. Guarantees
/// the executor's termination contract: the deck either ends at exactly
/// `target_size` or the request fails with `ExecutorFailure`, rather than
/// only logging a mismatch as the system this is grounded on did.
fn force_to_target_size(deck: &mut Deck, target_size: u32) {
    deck.recalculate_totals();

    if deck.total_cards < target_size {
        let mut shortfall = target_size - deck.total_cards;
        if let Some(land) = deck.cards.iter_mut().find(|dc| dc.card.is_basic_land()) {
            land.quantity += shortfall;
            shortfall = 0;
        }
        if shortfall > 0 {
            deck.cards
                .push(DeckCard::new(Card::basic_land(Color::Colorless), shortfall));
        }
    } else if deck.total_cards > target_size {
        let mut excess = deck.total_cards - target_size;
        deck.cards.sort_by_key(|dc| dc.quantity);
        for dc in deck.cards.iter_mut() {
            if excess == 0 || dc.card.is_land() {
                continue;
            }
            let take = dc.quantity.min(excess);
            dc.quantity -= take;
            excess -= take;
        }
        if excess > 0 {
            for dc in deck.cards.iter_mut() {
                if excess == 0 {
                    break;
                }
                let take = dc.quantity.min(excess);
                dc.quantity -= take;
                excess -= take;
            }
        }
        deck.cards.retain(|dc| dc.quantity > 0);
    }

    deck.recalculate_totals();
}

impl PlanExecutor {
    /// Build path: materializes a fresh deck from a construction plan (or,
    /// when `plan` is `None`, the deterministic minimal fallback used when
    /// the Deck Builder Agent's LLM call fails).
    pub async fn build(
        repo: &CardRepository,
        request: &BuildRequest,
        plan: Option<ConstructionPlan>,
    ) -> Result<Deck, OrchestratorError> {
        let target_size = resolve_target_size(request)?;

        match plan {
            None => Ok(Self::fallback_build(request, target_size)),
            Some(plan) => {
                tracing::info!(strategy = %plan.strategy, "executing construction plan");

                let mut deck = Deck::new(&request.format, &request.archetype, request.colors.clone());
                let land_count = FormatRules::get_land_count(&request.format, &request.archetype)?;
                let spell_slots = target_size.saturating_sub(land_count);

                deck.cards.extend(distribute_lands(&request.colors, land_count));

                let mut cards_added = 0u32;
                for selection in plan.card_selections {
                    if cards_added >= spell_slots {
                        tracing::debug!("spell slots filled, ignoring remaining selections");
                        break;
                    }
                    if selection.card_name.trim().is_empty() {
                        continue;
                    }
                    let quantity = selection.quantity.min(spell_slots - cards_added);
                    if quantity == 0 {
                        continue;
                    }
                    match repo.get_by_name(&selection.card_name).await {
                        Ok(Some(card)) if !card.is_land() => {
                            cards_added += quantity;
                            deck.cards.push(DeckCard::new(card, quantity));
                        }
                        Ok(Some(_)) => {
                            // Agent selected a land; lands are executor-owned.
                        }
                        Ok(None) => {
                            tracing::warn!(card = %selection.card_name, "selected card not found");
                        }
                        Err(e) => {
                            tracing::warn!(card = %selection.card_name, error = %e, "card lookup failed");
                        }
                    }
                }

                if cards_added < spell_slots {
                    add_filler_cards(repo, &mut deck, spell_slots - cards_added, request).await?;
                }

                validate_quantities(&mut deck, &request.format)?;
                deck.recalculate_totals();
                force_to_target_size(&mut deck, target_size);
                validate_quantities(&mut deck, &request.format)?;

                if deck.total_cards != target_size {
                    return Err(OrchestratorError::ExecutorFailure(format!(
                        "deck has {} cards, expected {target_size}",
                        deck.total_cards
                    )));
                }

                Ok(deck)
            }
        }
    }

    /// The minimal construction used when the Deck Builder Agent's LLM call
    /// fails entirely in build mode: basic lands only, distributed
    /// remainder-aware across the requested colors so the deck still ends
    /// at exactly `target_size`.
    fn fallback_build(request: &BuildRequest, target_size: u32) -> Deck {
        let mut deck = Deck::new(&request.format, &request.archetype, request.colors.clone());
        if !request.colors.is_empty() {
            deck.cards.extend(distribute_lands(&request.colors, target_size));
        }
        force_to_target_size(&mut deck, target_size);
        deck
    }

    /// Refine path: applies an edit plan's add/remove actions to an
    /// existing deck, then corrects size and re-validates quantities.
    pub async fn refine(
        repo: &CardRepository,
        request: &BuildRequest,
        mut deck: Deck,
        plan: EditPlan,
    ) -> Result<Deck, OrchestratorError> {
        let target_size = FormatRules::get_deck_size(&request.format)?;

        tracing::info!(analysis = %plan.analysis, "executing refinement plan");

        for action in plan.actions {
            match action.action_type {
                EditActionType::Remove => remove_card(&mut deck, &action.card_name, action.quantity),
                EditActionType::Add => {
                    add_card(repo, &mut deck, &action.card_name, action.quantity).await
                }
            }
        }

        deck.recalculate_totals();
        let delta = target_size as i64 - deck.total_cards as i64;

        if delta > 0 {
            add_filler_cards(repo, &mut deck, delta as u32, request).await?;
        } else if delta < 0 {
            let mut excess = (-delta) as u32;
            deck.cards.sort_by_key(|dc| dc.quantity);
            for dc in deck.cards.iter_mut() {
                if excess == 0 || dc.card.is_land() {
                    continue;
                }
                let take = dc.quantity.min(excess);
                dc.quantity -= take;
                excess -= take;
            }
            deck.cards.retain(|dc| dc.quantity > 0);
        }

        validate_quantities(&mut deck, &request.format)?;
        deck.recalculate_totals();
        force_to_target_size(&mut deck, target_size);
        validate_quantities(&mut deck, &request.format)?;

        if deck.total_cards != target_size {
            return Err(OrchestratorError::ExecutorFailure(format!(
                "refined deck has {} cards, expected {target_size}",
                deck.total_cards
            )));
        }

        Ok(deck)
    }
}

fn remove_card(deck: &mut Deck, card_name: &str, quantity: u32) {
    let mut remaining = quantity;
    deck.cards.retain_mut(|dc| {
        if remaining == 0 || !dc.card.name.eq_ignore_ascii_case(card_name) {
            return true;
        }
        let take = dc.quantity.min(remaining);
        dc.quantity -= take;
        remaining -= take;
        dc.quantity > 0
    });
}

async fn add_card(repo: &CardRepository, deck: &mut Deck, card_name: &str, quantity: u32) {
    if let Some(existing) = deck.find_by_name_mut(card_name) {
        existing.quantity += quantity;
        return;
    }
    if let Ok(Some(card)) = repo.get_by_name(card_name).await {
        deck.cards.push(DeckCard::new(card, quantity));
    } else {
        tracing::warn!(card = %card_name, "add action referenced an unresolvable card");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardSelection;
    use crate::store::SqliteCardStore;
    use crate::vector::DisabledVectorStore;
    use std::sync::Arc;

    fn request(format: &str, archetype: &str, colors: &[&str]) -> BuildRequest {
        BuildRequest {
            format: format.to_string(),
            colors: colors.iter().map(|c| c.to_string()).collect(),
            archetype: archetype.to_string(),
            strategy: String::new(),
            deck_size: 0,
            quality_threshold: 0.7,
            max_iterations: 5,
        }
    }

    fn repo() -> CardRepository {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        CardRepository::new(store, Arc::new(DisabledVectorStore), 100)
    }

    #[tokio::test]
    async fn fallback_build_fills_exactly_target_size_with_one_color() {
        let req = request("Standard", "Aggro", &["R"]);
        let deck = PlanExecutor::build(&repo(), &req, None).await.unwrap();
        assert_eq!(deck.total_cards, 60);
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].card.name, "Mountain");
    }

    #[tokio::test]
    async fn fallback_build_distributes_lands_across_multiple_colors_without_undercount() {
        let req = request("Commander", "Midrange", &["R", "G"]);
        let deck = PlanExecutor::build(&repo(), &req, None).await.unwrap();
        assert_eq!(deck.total_cards, 100);
    }

    #[tokio::test]
    async fn empty_plan_still_reaches_legal_size_via_filler() {
        let req = request("Standard", "Aggro", &["R"]);
        let plan = ConstructionPlan {
            strategy: "test".to_string(),
            card_selections: vec![],
        };
        let deck = PlanExecutor::build(&repo(), &req, Some(plan)).await.unwrap();
        assert_eq!(deck.total_cards, 60);
    }

    #[tokio::test]
    async fn plan_selections_are_capped_at_spell_slots() {
        let req = request("Standard", "Aggro", &["R"]);
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        let mut bolt = Card::basic_land(Color::Red);
        bolt.id = "bolt".into();
        bolt.name = "Lightning Bolt".into();
        bolt.type_line = "Instant".into();
        bolt.types = vec!["Instant".into()];
        bolt.subtypes.clear();
        bolt.cmc = 1.0;
        store.insert_card(&bolt).await.unwrap();
        let repo = CardRepository::new(store, Arc::new(DisabledVectorStore), 100);

        let plan = ConstructionPlan {
            strategy: "test".to_string(),
            card_selections: vec![CardSelection {
                card_name: "Lightning Bolt".to_string(),
                quantity: 4,
                reasoning: "burn".to_string(),
            }],
        };
        let deck = PlanExecutor::build(&repo, &req, Some(plan)).await.unwrap();
        assert_eq!(deck.total_cards, 60);
        assert!(deck.find_by_name("Lightning Bolt").unwrap().quantity <= 4);
    }

    #[tokio::test]
    async fn oversized_refine_trims_down_to_exact_target_preferring_small_stacks() {
        let req = request("Standard", "Aggro", &["R"]);
        let mut deck = Deck::new("Standard", "Aggro", vec!["R".to_string()]);
        let mut goblin = Card::basic_land(Color::Red);
        goblin.id = "goblin".into();
        goblin.name = "Goblin Guide".into();
        goblin.type_line = "Creature — Goblin".into();
        goblin.types = vec!["Creature".into()];
        deck.cards.push(DeckCard::new(goblin, 2));
        deck.cards.push(DeckCard::new(Card::basic_land(Color::Red), 60));
        deck.recalculate_totals();
        assert_eq!(deck.total_cards, 62);

        let plan = EditPlan {
            analysis: "test".to_string(),
            actions: vec![],
        };
        let deck = PlanExecutor::refine(&repo(), &req, deck, plan).await.unwrap();
        assert_eq!(deck.total_cards, 60);
    }

    #[tokio::test]
    async fn singleton_format_caps_non_basic_lands_at_one_copy() {
        let req = request("Commander", "Midrange", &["R"]);
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        let mut bolt = Card::basic_land(Color::Red);
        bolt.id = "bolt".into();
        bolt.name = "Lightning Bolt".into();
        bolt.type_line = "Instant".into();
        bolt.types = vec!["Instant".into()];
        bolt.subtypes.clear();
        bolt.cmc = 1.0;
        store.insert_card(&bolt).await.unwrap();
        let repo = CardRepository::new(store, Arc::new(DisabledVectorStore), 100);

        let plan = ConstructionPlan {
            strategy: "test".to_string(),
            card_selections: vec![CardSelection {
                card_name: "Lightning Bolt".to_string(),
                quantity: 3,
                reasoning: "burn".to_string(),
            }],
        };
        let deck = PlanExecutor::build(&repo, &req, Some(plan)).await.unwrap();
        assert_eq!(deck.find_by_name("Lightning Bolt").unwrap().quantity, 1);
        assert_eq!(deck.total_cards, 100);
    }
}
