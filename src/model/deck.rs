use serde::{Deserialize, Serialize};

use super::card::Card;

/// A stack of identical cards within a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckCard {
    pub card: Card,
    pub quantity: u32,
}

impl DeckCard {
    pub fn new(card: Card, quantity: u32) -> Self {
        Self { card, quantity }
    }
}

/// The deck under construction or refinement. Mutated only by the Plan
/// Executor; agents emit plans, never deck diffs, against this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub format: String,
    pub archetype: String,
    pub colors: Vec<String>,
    pub cards: Vec<DeckCard>,
    pub total_cards: u32,
}

impl Deck {
    pub fn new(format: impl Into<String>, archetype: impl Into<String>, colors: Vec<String>) -> Self {
        Self {
            format: format.into(),
            archetype: archetype.into(),
            colors,
            cards: Vec::new(),
            total_cards: 0,
        }
    }

    pub fn recalculate_totals(&mut self) {
        self.total_cards = self.cards.iter().map(|dc| dc.quantity).sum();
    }

    pub fn land_count(&self) -> u32 {
        self.cards
            .iter()
            .filter(|dc| dc.card.is_land())
            .map(|dc| dc.quantity)
            .sum()
    }

    pub fn spell_count(&self) -> u32 {
        self.total_cards.saturating_sub(self.land_count())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&DeckCard> {
        self.cards
            .iter()
            .find(|dc| dc.card.name.eq_ignore_ascii_case(name))
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut DeckCard> {
        self.cards
            .iter_mut()
            .find(|dc| dc.card.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    #[test]
    fn totals_reflect_quantities() {
        let mut deck = Deck::new("Standard", "Aggro", vec!["R".to_string()]);
        deck.cards.push(DeckCard::new(Card::basic_land(Color::Red), 22));
        deck.recalculate_totals();
        assert_eq!(deck.total_cards, 22);
        assert_eq!(deck.land_count(), 22);
        assert_eq!(deck.spell_count(), 0);
    }
}
