use crate::model::Card;

/// Generates the deterministic synergy/anti-synergy/role/format-consideration
/// tags folded into a card's semantic description. Every branch here is
/// grounded rule-for-rule in the strategic-tag generator this system's
/// semantic search was built around; the tags exist purely to enrich the
/// embedding input, not to drive any other component.
pub fn generate_strategic_tags(card: &Card) -> Vec<String> {
    let mut tags = Vec::new();
    let text = card.oracle_text.to_lowercase();
    let type_line = &card.type_line;
    let is_creature = card.is_creature();

    // --- Synergies ---
    if text.contains("graveyard")
        || text.contains("dies")
        || text.contains("return")
        || text.contains("reanimate")
        || text.contains("from your graveyard")
    {
        tags.push("Graveyard synergies".to_string());
    }

    if is_creature {
        for subtype in &card.subtypes {
            if subtype != "Legendary" {
                tags.push(format!("{subtype} tribal synergies"));
            }
        }
    }

    if text.contains("+1/+1 counter") || text.contains("counter on") {
        tags.push("+1/+1 counter synergies".to_string());
    }

    if type_line.contains("Artifact") || text.contains("artifact") {
        tags.push("Artifact synergies".to_string());
    }

    if type_line.contains("Enchantment") {
        tags.push("Enchantment synergies".to_string());
    }

    if text.contains("instant or sorcery")
        || text.contains("cast a spell")
        || text.contains("noncreature spell")
        || text.contains("whenever you cast")
    {
        tags.push("Spellslinger synergies".to_string());
    }

    if text.contains("token") || text.contains("create") {
        tags.push("Token synergies".to_string());
    }

    if text.contains("sacrifice") {
        tags.push("Sacrifice synergies".to_string());
    }

    if text.contains("gain") && text.contains("life") {
        tags.push("Life gain synergies".to_string());
    }

    // --- Anti-synergies ---
    if text.contains("exile")
        && (text.contains("target") || text.contains("destroy") || text.contains("remove"))
    {
        tags.push("Exile-based removal (anti-synergy with graveyard strategies)".to_string());
    }

    if text.contains("exile") && text.contains("graveyard") {
        tags.push("Graveyard hate (anti-synergy with reanimator strategies)".to_string());
    }

    if text.contains("discard") && text.contains("each player") {
        tags.push("Symmetric discard (anti-synergy with hand-focused strategies)".to_string());
    }

    // --- Roles ---
    if card.cmc == 1.0 && is_creature {
        tags.push("Aggressive one-drop".to_string());
    }
    if card.cmc == 1.0 && (type_line.contains("Instant") || type_line.contains("Sorcery")) {
        tags.push("Efficient interaction".to_string());
    }

    let has_haste = card.keywords.iter().any(|k| k.eq_ignore_ascii_case("haste")) || text.contains("haste");
    if is_creature && card.cmc <= 3.0 && has_haste {
        tags.push("Aggressive threat with haste".to_string());
    }

    if let Ok(power) = card.power.as_deref().unwrap_or("").parse::<f64>() {
        if power >= card.cmc {
            tags.push("Efficient aggressive threat".to_string());
        }
    }

    let evasive = ["flying", "unblockable", "menace", "trample"];
    if evasive.iter().any(|k| {
        card.keywords.iter().any(|kw| kw.eq_ignore_ascii_case(k)) || text.contains(k)
    }) {
        tags.push("Evasive threat".to_string());
    }

    if is_creature && card.cmc >= 5.0 {
        tags.push("Control finisher".to_string());
    }

    if text.contains("draw a card") || text.contains("draw cards") || text.contains("draw two") {
        tags.push("Card advantage engine".to_string());
    }

    let is_targeted_removal =
        text.contains("destroy target") || text.contains("exile target") || text.contains("deals damage to target");
    if is_targeted_removal {
        if text.contains("creature") {
            tags.push("Creature removal".to_string());
        }
        if text.contains("planeswalker") || text.contains("any target") {
            tags.push("Flexible removal".to_string());
        }
    }

    let is_board_wipe = (text.contains("destroy all")
        || text.contains("exile all")
        || text.contains("damage to each"))
        && text.contains("creature");
    if is_board_wipe {
        tags.push("Board wipe".to_string());
        tags.push("Avoid in creature-heavy decks".to_string());
    }

    let mentions_mana = text.contains("mana") || type_line.contains("Land");
    if (text.contains("add") || text.contains("search your library for a land") || text.contains("put a land")) && mentions_mana {
        tags.push("Ramp".to_string());
    }

    let protection = ["hexproof", "shroud", "protection", "indestructible"];
    if protection.iter().any(|k| text.contains(k)) {
        tags.push("Protection".to_string());
    }

    if text.contains("counter target") {
        tags.push("Counterspell".to_string());
    }

    if text.contains("discard") && text.contains("target") {
        tags.push("Hand disruption".to_string());
    }

    if text.contains("untap") || text.contains("infinite") || text.contains("take an extra turn") {
        tags.push("Combo enabler".to_string());
    }

    // --- Format considerations ---
    if text.contains("commander") || card.cmc >= 6.0 {
        tags.push("Commander-suited".to_string());
    }
    if card.cmc <= 2.0 && is_creature {
        tags.push("Aggressive-format-suited".to_string());
    }

    tags
}

/// Assembles the full document embedded for semantic search: identity,
/// color phrasing, rules text, power/toughness or loyalty, keywords, and the
/// strategic-tag block, joined with ". " in that order.
pub fn build_semantic_document(card: &Card) -> String {
    let mut parts = Vec::new();

    parts.push(format!("{} is a {}", card.name, card.type_line));

    if !card.colors.is_empty() {
        let color_names: Vec<&str> = card
            .colors
            .iter()
            .map(|c| match c.as_str() {
                "W" => "white",
                "U" => "blue",
                "B" => "black",
                "R" => "red",
                "G" => "green",
                _ => "colorless",
            })
            .collect();
        parts.push(format!("{} card", color_names.join(" and ")));
    }

    if !card.oracle_text.is_empty() {
        parts.push(card.oracle_text.clone());
    }

    if let (Some(p), Some(t)) = (&card.power, &card.toughness) {
        parts.push(format!("{p}/{t}"));
    } else if let Some(loyalty) = &card.loyalty {
        parts.push(format!("starting loyalty {loyalty}"));
    }

    if !card.keywords.is_empty() {
        parts.push(card.keywords.join(", "));
    }

    let tags = generate_strategic_tags(card);
    if !tags.is_empty() {
        parts.push(tags.join(", "));
    }

    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    #[test]
    fn one_drop_creature_gets_aggressive_tag() {
        let mut card = Card::basic_land(Color::Red);
        card.type_line = "Creature — Goblin".to_string();
        card.types = vec!["Creature".to_string()];
        card.subtypes = vec!["Goblin".to_string()];
        card.cmc = 1.0;
        let tags = generate_strategic_tags(&card);
        assert!(tags.contains(&"Aggressive one-drop".to_string()));
        assert!(tags.contains(&"Goblin tribal synergies".to_string()));
    }

    #[test]
    fn board_wipe_gets_removal_and_anti_synergy_tag() {
        let mut card = Card::basic_land(Color::Black);
        card.type_line = "Sorcery".to_string();
        card.types = vec!["Sorcery".to_string()];
        card.subtypes.clear();
        card.oracle_text = "Destroy all creatures.".to_string();
        let tags = generate_strategic_tags(&card);
        assert!(tags.contains(&"Board wipe".to_string()));
        assert!(tags.contains(&"Avoid in creature-heavy decks".to_string()));
    }

    #[test]
    fn targeted_creature_removal_gets_removal_tag() {
        let mut card = Card::basic_land(Color::Black);
        card.type_line = "Instant".to_string();
        card.types = vec!["Instant".to_string()];
        card.subtypes.clear();
        card.oracle_text = "Destroy target creature.".to_string();
        let tags = generate_strategic_tags(&card);
        assert!(tags.contains(&"Creature removal".to_string()));
    }

    #[test]
    fn hexproof_grant_without_removal_gate_is_not_mistagged_as_removal() {
        let mut card = Card::basic_land(Color::White);
        card.type_line = "Instant".to_string();
        card.types = vec!["Instant".to_string()];
        card.subtypes.clear();
        card.oracle_text = "Target creature you control gains hexproof from any target until end of turn.".to_string();
        let tags = generate_strategic_tags(&card);
        assert!(!tags.contains(&"Flexible removal".to_string()));
        assert!(!tags.contains(&"Creature removal".to_string()));
    }

    #[test]
    fn semantic_document_includes_tags_and_text() {
        let mut card = Card::basic_land(Color::Blue);
        card.name = "Brainstorm".to_string();
        card.type_line = "Instant".to_string();
        card.types = vec!["Instant".to_string()];
        card.subtypes.clear();
        card.colors = vec!["U".to_string()];
        card.oracle_text = "Draw three cards, then put two cards from your hand on top of your library.".to_string();
        let doc = build_semantic_document(&card);
        assert!(doc.contains("Brainstorm"));
        assert!(doc.contains("blue card"));
    }
}
