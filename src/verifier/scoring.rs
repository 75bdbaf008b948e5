use std::collections::HashMap;

use crate::error::OrchestratorError;
use crate::format::FormatRules;
use crate::model::{BuildRequest, Deck, QualityMetrics};

fn mana_curve_score(deck: &Deck, format: &str) -> Result<f64, OrchestratorError> {
    let targets = FormatRules::get_mana_curve_targets(format)?;
    let spells: Vec<_> = deck.cards.iter().filter(|dc| !dc.card.is_land()).collect();
    let spell_total: u32 = spells.iter().map(|dc| dc.quantity).sum();
    if spell_total == 0 {
        return Ok(0.0);
    }

    let mut actual: HashMap<u32, f64> = HashMap::new();
    for dc in &spells {
        let bucket = (dc.card.cmc.max(0.0).floor() as u32).min(6);
        *actual.entry(bucket).or_insert(0.0) += dc.quantity as f64;
    }
    for v in actual.values_mut() {
        *v /= spell_total as f64;
    }

    // Sum of absolute differences between two distributions that each sum
    // to 1.0 ranges from 0 (identical) to 2 (disjoint support).
    let deviation: f64 = (0..=6)
        .map(|cmc| {
            let target = targets.get(&cmc).copied().unwrap_or(0.0);
            let actual = actual.get(&cmc).copied().unwrap_or(0.0);
            (target - actual).abs()
        })
        .sum();

    Ok((1.0 - deviation / 2.0).clamp(0.0, 1.0))
}

fn land_ratio_score(deck: &Deck, format: &str) -> Result<f64, OrchestratorError> {
    let target = FormatRules::get_land_ratio(format)?;
    let actual = if deck.total_cards == 0 {
        0.0
    } else {
        deck.land_count() as f64 / deck.total_cards as f64
    };
    let deviation = (actual - target).abs();

    Ok(if deviation <= 0.05 {
        1.0
    } else if deviation <= 0.10 {
        0.7
    } else {
        (0.5 - deviation).max(0.0)
    })
}

/// Counts distinct synergy clusters rather than weighting by card quantity:
/// up to 0.5 for keyword clusters of 4+ copies (0.15 each), up to 0.5 for
/// tribal (creature subtype) clusters of 8+ copies (0.25 each), clipped to
/// [0, 1]. Keyword counts are taken over the whole deck (lands included, as
/// a land can still carry a keyword); tribal counts only creature cards.
fn synergy_score(deck: &Deck) -> f64 {
    let mut keyword_counts: HashMap<&str, u32> = HashMap::new();
    let mut subtype_counts: HashMap<&str, u32> = HashMap::new();

    for dc in &deck.cards {
        for kw in &dc.card.keywords {
            *keyword_counts.entry(kw.as_str()).or_insert(0) += dc.quantity;
        }
        if dc.card.types.iter().any(|t| t == "Creature") {
            for st in &dc.card.subtypes {
                *subtype_counts.entry(st.as_str()).or_insert(0) += dc.quantity;
            }
        }
    }

    let strong_keywords = keyword_counts.values().filter(|&&v| v >= 4).count();
    let strong_tribes = subtype_counts.values().filter(|&&v| v >= 8).count();

    let score = (strong_keywords as f64 * 0.15).min(0.5) + (strong_tribes as f64 * 0.25).min(0.5);
    score.min(1.0)
}

/// Weights each non-land stack by its copy count (4-of=1.0, 3-of=0.75,
/// 2-of=0.5, 1-of=0.25) and averages over the number of unique non-land
/// stacks, not over total card count — a deck with a handful of 4-ofs scores
/// the same whether behind them sit a wide or narrow land base. Singleton
/// formats cap every stack at 1 copy, so this is informational there; the
/// curve, land ratio, and synergy subscores carry the real signal.
fn consistency_score(deck: &Deck) -> f64 {
    let spells: Vec<_> = deck.cards.iter().filter(|dc| !dc.card.is_land()).collect();
    if spells.is_empty() {
        return 0.0;
    }

    let weight = |quantity: u32| -> f64 {
        match quantity {
            4 => 1.0,
            3 => 0.75,
            2 => 0.5,
            _ => 0.25,
        }
    };

    let total: f64 = spells.iter().map(|dc| weight(dc.quantity)).sum();
    (total / spells.len() as f64).min(1.0)
}

/// Deterministic, format-aware deck scoring. No network calls; the optional
/// LLM improvement step lives in `advisor` and is layered on top of this.
pub struct QualityVerifier;

impl QualityVerifier {
    pub fn verify(deck: &Deck, request: &BuildRequest) -> Result<QualityMetrics, OrchestratorError> {
        let format = &request.format;
        let mana_curve = mana_curve_score(deck, format)?;
        let land_ratio = land_ratio_score(deck, format)?;
        let synergy = synergy_score(deck);
        let consistency = consistency_score(deck);

        let mut metrics = QualityMetrics::new(mana_curve, land_ratio, synergy, consistency);

        let target_size = if request.deck_size > 0 {
            request.deck_size
        } else {
            FormatRules::get_deck_size(format)?
        };

        if mana_curve < 0.6 {
            metrics
                .issues
                .push("mana curve deviates from the archetype's target distribution".to_string());
            metrics
                .suggestions
                .push("adjust spell CMC distribution toward the curve targets for this archetype".to_string());
        }
        if land_ratio < 0.6 {
            metrics.issues.push("land ratio is off target".to_string());
            metrics
                .suggestions
                .push("adjust the land count toward this format's target land ratio".to_string());
        }
        if synergy < 0.4 {
            metrics.issues.push("few cards share a clear tribal or mechanical theme".to_string());
            metrics
                .suggestions
                .push("consolidate around a smaller set of synergistic subtypes or keywords".to_string());
        }
        if consistency < 0.5 && !FormatRules::is_singleton(format)? {
            metrics
                .issues
                .push("spell slots are spread thin across too many one-ofs".to_string());
            metrics
                .suggestions
                .push("play more copies of your strongest cards instead of a wide spread".to_string());
        }

        // Hard-zero last: this must run after every issue/suggestion above is
        // appended and after the weighted overall score is computed, or a
        // later recompute of the weighted average would silently undo it.
        if deck.total_cards != target_size {
            metrics.issues.push(format!(
                "deck has {} cards, expected {target_size}",
                deck.total_cards
            ));
            metrics.zero_out_for_size_mismatch();
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, Color, DeckCard};

    fn request(format: &str) -> BuildRequest {
        BuildRequest {
            format: format.to_string(),
            colors: vec!["R".to_string()],
            archetype: "Aggro".to_string(),
            strategy: String::new(),
            deck_size: 0,
            quality_threshold: 0.7,
            max_iterations: 5,
        }
    }

    #[test]
    fn correctly_sized_deck_with_on_ratio_lands_is_not_zeroed() {
        let mut deck = Deck::new("Standard", "Aggro", vec!["R".to_string()]);
        deck.cards.push(DeckCard::new(Card::basic_land(Color::Red), 24));
        let mut goblin = Card::basic_land(Color::Red);
        goblin.id = "goblin".into();
        goblin.name = "Goblin Raider".into();
        goblin.type_line = "Creature — Goblin".into();
        goblin.types = vec!["Creature".into()];
        goblin.subtypes = vec!["Goblin".into()];
        goblin.keywords = vec!["Haste".into()];
        goblin.cmc = 2.0;
        deck.cards.push(DeckCard::new(goblin, 36));
        deck.recalculate_totals();
        assert_eq!(deck.total_cards, 60);

        let metrics = QualityVerifier::verify(&deck, &request("Standard")).unwrap();
        assert_eq!(metrics.land_ratio, 1.0);
        // One keyword cluster (Haste, 36 copies >= 4 -> 0.15) plus one tribal
        // cluster (Goblin, 36 copies >= 8 -> 0.25).
        assert!((metrics.synergy - 0.40).abs() < 1e-9);
        assert!(metrics.overall_score > 0.0);
    }

    #[test]
    fn undersized_deck_is_hard_zeroed() {
        let mut deck = Deck::new("Standard", "Aggro", vec!["R".to_string()]);
        deck.cards.push(DeckCard::new(Card::basic_land(Color::Red), 40));
        deck.recalculate_totals();

        let metrics = QualityVerifier::verify(&deck, &request("Standard")).unwrap();
        assert_eq!(metrics.overall_score, 0.0);
        assert!(metrics.issues.iter().any(|i| i.contains("expected 60")));
    }

    #[test]
    fn singleton_decks_are_pinned_at_the_one_of_weight() {
        // Singleton formats cap every non-land stack at quantity 1, so this
        // subscore is always 0.25 there regardless of deck quality -- the
        // curve/land/synergy subscores are what actually differentiate a
        // Commander deck's consistency.
        let mut deck = Deck::new("Commander", "Midrange", vec!["R".to_string()]);
        deck.cards.push(DeckCard::new(Card::basic_land(Color::Red), 37));
        for i in 0..63 {
            let mut spell = Card::basic_land(Color::Red);
            spell.id = format!("spell-{i}");
            spell.name = format!("Singleton Spell {i}");
            spell.type_line = "Sorcery".into();
            spell.types = vec!["Sorcery".into()];
            spell.cmc = 3.0;
            deck.cards.push(DeckCard::new(spell, 1));
        }
        deck.recalculate_totals();
        assert_eq!(deck.total_cards, 100);

        let metrics = QualityVerifier::verify(&deck, &request("Commander")).unwrap();
        assert!((metrics.consistency - 0.25).abs() < 1e-9);
    }
}
