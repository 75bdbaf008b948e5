use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A card as it appears in the catalog. Immutable once loaded; the Card
/// Store, Vector Store, and Cache all hand out copies of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub mana_cost: Option<String>,
    pub cmc: f64,
    pub colors: Vec<String>,
    pub color_identity: Vec<String>,
    pub type_line: String,
    pub types: Vec<String>,
    pub subtypes: Vec<String>,
    pub oracle_text: String,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub set_code: String,
    pub rarity: String,
    pub legalities: HashMap<String, String>,
    pub keywords: Vec<String>,
}

impl Card {
    pub fn is_legendary(&self) -> bool {
        self.type_line.contains("Legendary")
    }

    pub fn is_basic_land(&self) -> bool {
        self.types.iter().any(|t| t == "Land") && self.type_line.starts_with("Basic")
    }

    pub fn is_land(&self) -> bool {
        self.types.iter().any(|t| t == "Land")
    }

    pub fn is_creature(&self) -> bool {
        self.types.iter().any(|t| t == "Creature")
    }

    pub fn is_legal_in(&self, format: &str) -> bool {
        self.legalities
            .get(&format.to_lowercase())
            .map(|status| status.eq_ignore_ascii_case("legal"))
            .unwrap_or(false)
    }

    /// First 100 characters of the oracle text, matching the truncation the
    /// deck-builder tool contract hands to agents.
    pub fn oracle_text_prefix(&self) -> String {
        self.oracle_text.chars().take(100).collect()
    }

    /// A minimal basic-land card, resolvable without a store lookup.
    pub fn basic_land(color: crate::model::Color) -> Card {
        let name = color.basic_land();
        Card {
            id: name.to_lowercase(),
            name: name.to_string(),
            mana_cost: None,
            cmc: 0.0,
            colors: Vec::new(),
            color_identity: vec![color.symbol().to_string()],
            type_line: "Basic Land".to_string(),
            types: vec!["Land".to_string()],
            subtypes: vec![name.to_string()],
            oracle_text: String::new(),
            power: None,
            toughness: None,
            loyalty: None,
            set_code: String::new(),
            rarity: "common".to_string(),
            legalities: HashMap::new(),
            keywords: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    #[test]
    fn basic_land_is_recognized_as_such() {
        let forest = Card::basic_land(Color::Green);
        assert!(forest.is_basic_land());
        assert!(forest.is_land());
        assert!(!forest.is_legendary());
    }

    #[test]
    fn legal_in_checks_case_insensitively() {
        let mut card = Card::basic_land(Color::Red);
        card.legalities.insert("standard".to_string(), "legal".to_string());
        assert!(card.is_legal_in("Standard"));
        assert!(!card.is_legal_in("modern"));
    }
}
