use crate::error::OrchestratorError;
use crate::format::FormatRules;

fn archetype_guidance(archetype: &str, spell_count: u32) -> String {
    match archetype.to_lowercase().as_str() {
        "aggro" => format!(
            "Prioritize low-curve threats and efficient removal; aim for roughly {} \
             creatures able to attack by turn three.",
            (spell_count as f64 * 0.6) as u32
        ),
        "control" => format!(
            "Prioritize card advantage, removal, and a small number of finishers; aim for \
             roughly {} removal spells and {} finishers.",
            (spell_count as f64 * 0.5) as u32,
            (spell_count as f64 * 0.15) as u32
        ),
        "combo" => format!(
            "Prioritize the combo pieces, tutors, and protection; aim for roughly {} combo \
             pieces, {} tutors, and {} protection spells.",
            (spell_count as f64 * 0.25) as u32,
            (spell_count as f64 * 0.15) as u32,
            (spell_count as f64 * 0.15) as u32
        ),
        _ => "Prioritize a balanced mix of efficient threats, interaction, and card \
              advantage typical of a midrange plan."
            .to_string(),
    }
}

fn quantity_rules(format: &str, copy_limit: u32, singleton: bool) -> String {
    if singleton {
        format!(
            "{format} is singleton: select at most one copy of any non-basic-land card."
        )
    } else {
        format!(
            "{format} allows up to {copy_limit} copies of any non-basic-land card; favor 3-4 \
             copies of your best cards over a wide spread of one-ofs."
        )
    }
}

/// System prompt for the Deck Builder Agent's build-mode invocation.
pub fn build_builder_prompt(format: &str, archetype: &str) -> Result<String, OrchestratorError> {
    let deck_size = FormatRules::get_deck_size(format)?;
    let copy_limit = FormatRules::get_copy_limit(format)?;
    let singleton = FormatRules::is_singleton(format)?;
    let legendary_max = FormatRules::get_legendary_max(format)?;
    let land_count = FormatRules::get_land_count(format, archetype)?;
    let spell_slots = deck_size.saturating_sub(land_count);

    Ok(format!(
        "You are building a {deck_size}-card {format} {archetype} deck. Lands will be added \
         automatically by the executor: select spells only, filling approximately {spell_slots} \
         spell slots. {} Legendary creatures and planeswalkers are capped at {legendary_max} \
         copies. {} Use at most 3-5 broad tool searches before committing to a plan.",
        archetype_guidance(archetype, spell_slots),
        quantity_rules(format, copy_limit, singleton),
    ))
}

/// System prompt for the Deck Builder Agent's refine-mode invocation.
pub fn build_refiner_prompt(format: &str, archetype: &str) -> Result<String, OrchestratorError> {
    let deck_size = FormatRules::get_deck_size(format)?;
    let copy_limit = FormatRules::get_copy_limit(format)?;
    let singleton = FormatRules::is_singleton(format)?;

    Ok(format!(
        "You are refining an existing {deck_size}-card {format} {archetype} deck based on \
         quality feedback. Emit an edit plan whose net add/remove delta brings the deck to \
         exactly {deck_size} cards. {}",
        quantity_rules(format, copy_limit, singleton),
    ))
}

/// System prompt for the Quality Verifier's optional LLM improvement pass.
pub fn build_verifier_prompt(format: &str) -> Result<String, OrchestratorError> {
    let land_ratio = FormatRules::get_land_ratio(format)?;
    Ok(format!(
        "You are reviewing a completed {format} deck for quality issues already identified by \
         deterministic scoring (mana curve, land ratio target {land_ratio:.2}, synergy, \
         consistency). Propose 2-5 specific removals and 2-5 specific additions, each with a \
         one-sentence reason, that would address the identified issues without changing the \
         deck's overall strategy."
    ))
}

/// System prompt for a hypothetical LLM-assisted Intent Parser. This
/// implementation's parser is rule-based (see the `intent` module) and does
/// not call an LLM, but the prompt is retained as the documented contract
/// for a provider that would replace it, mirroring the five-intent taxonomy
/// and confidence rubric the rule-based parser itself implements.
pub fn build_intent_prompt(format: &str) -> String {
    format!(
        "Classify the user's free-form {format} deck modification request into exactly one of: \
         add, remove, replace, optimize, strategy_shift. Extract any card names mentioned. Score \
         your confidence: 0.9-1.0 for requests naming specific cards, 0.7-0.9 for clear but \
         abstract requests, 0.5-0.7 for ambiguous requests, 0.3-0.5 for vague requests."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_prompt_mentions_spell_slots_and_legendary_cap() {
        let prompt = build_builder_prompt("Commander", "Midrange").unwrap();
        assert!(prompt.contains("100-card"));
        assert!(prompt.contains("capped at 1 copies"));
    }

    #[test]
    fn refiner_prompt_uses_singleton_language_for_commander() {
        let prompt = build_refiner_prompt("Commander", "Midrange").unwrap();
        assert!(prompt.contains("singleton"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(build_builder_prompt("Pauper", "Aggro").is_err());
    }
}
