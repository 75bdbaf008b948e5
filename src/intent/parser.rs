use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{IntentType, ParsedIntent};

lazy_static! {
    static ref REPLACE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\breplace\b").unwrap(),
        Regex::new(r"(?i)\bswap\b").unwrap(),
        Regex::new(r"(?i)\binstead of\b").unwrap(),
        Regex::new(r"(?i)\bswitch\b").unwrap(),
    ];
    static ref STRATEGY_SHIFT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bchange (the )?strategy\b").unwrap(),
        Regex::new(r"(?i)\bpivot\b").unwrap(),
        Regex::new(r"(?i)\brebuild\b").unwrap(),
        Regex::new(r"(?i)\bdifferent archetype\b").unwrap(),
        Regex::new(r"(?i)\bshift (to|toward)\b").unwrap(),
        Regex::new(r"(?i)\bmake (it|this) (more|less) (aggressive|controlling|aggro|control)\b").unwrap(),
    ];
    static ref REMOVE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bremove\b").unwrap(),
        Regex::new(r"(?i)\bcut\b").unwrap(),
        Regex::new(r"(?i)\btake out\b").unwrap(),
        Regex::new(r"(?i)\bfewer\b").unwrap(),
        Regex::new(r"(?i)\bless\b").unwrap(),
    ];
    static ref ADD_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\badd\b").unwrap(),
        Regex::new(r"(?i)\binclude\b").unwrap(),
        Regex::new(r"(?i)\bmore\b").unwrap(),
        Regex::new(r"(?i)\bput in\b").unwrap(),
    ];
    static ref OPTIMIZE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\boptimize\b").unwrap(),
        Regex::new(r"(?i)\bimprove\b").unwrap(),
        Regex::new(r"(?i)\btune\b").unwrap(),
        Regex::new(r"(?i)\bfix\b").unwrap(),
        Regex::new(r"(?i)\bbetter\b").unwrap(),
    ];

    /// Runs of one to four capitalized words, the same heuristic a human
    /// skimming a deck-change request would use to spot a card name without
    /// a catalog lookup.
    static ref CARD_NAME_PATTERN: Regex =
        Regex::new(r"\b([A-Z][a-zA-Z'àâäéèêëïîôöùûü]*(?:\s[A-Z][a-zA-Z'àâäéèêëïîôöùûü]*){0,3})\b").unwrap();

    static ref SENTENCE_START_STOPWORDS: std::collections::HashSet<&'static str> = [
        "I", "Please", "Can", "Could", "Would", "The", "My", "This", "Deck", "It",
    ]
    .into_iter()
    .collect();

    static ref BUDGET_PATTERN: Regex = Regex::new(r"(?i)\$\s?(\d+(?:\.\d+)?)").unwrap();
    static ref KEEP_PATTERN: Regex =
        Regex::new(r"(?i)\bkeep\b[^.,;]*?\b([A-Z][a-zA-Z'àâäéèêëïîôöùûü]*(?:\s[A-Z][a-zA-Z'àâäéèêëïîôöùûü]*){0,3})\b").unwrap();
}

/// Rule-based reading of a free-form deck modification request. No LLM call:
/// classification is keyword-pattern matching, and card names are guessed
/// from capitalization rather than resolved against the catalog (the Plan
/// Executor resolves names later and silently drops ones that don't exist).
pub struct IntentParser;

impl IntentParser {
    pub fn parse(text: &str) -> ParsedIntent {
        let matched_replace = any_match(&REPLACE_PATTERNS, text);
        let matched_strategy_shift = any_match(&STRATEGY_SHIFT_PATTERNS, text);
        let matched_remove = any_match(&REMOVE_PATTERNS, text);
        let matched_add = any_match(&ADD_PATTERNS, text);
        let matched_optimize = any_match(&OPTIMIZE_PATTERNS, text);

        let matches = [
            matched_replace,
            matched_strategy_shift,
            matched_remove,
            matched_add,
            matched_optimize,
        ];
        let match_count = matches.iter().filter(|m| **m).count();

        // Priority: an explicit replace/swap phrasing is the least
        // ambiguous signal, then a strategy-level request, then a plain
        // add or remove, with optimize as the catch-all.
        let intent_type = if matched_replace {
            IntentType::Replace
        } else if matched_strategy_shift {
            IntentType::StrategyShift
        } else if matched_remove {
            IntentType::Remove
        } else if matched_add {
            IntentType::Add
        } else {
            IntentType::Optimize
        };

        let card_changes = extract_card_names(text);

        let confidence = if match_count == 0 {
            0.4
        } else if match_count > 1 {
            0.6
        } else if !card_changes.is_empty() {
            0.95
        } else {
            0.8
        };

        ParsedIntent {
            intent_type,
            description: text.trim().to_string(),
            card_changes,
            constraints: extract_constraints(text),
            confidence,
        }
    }
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Budget and "keep this card" phrasing, the two constraint shapes the
/// prompt builder asks the model to surface. Rule-based like the rest of
/// this parser: a dollar amount becomes a budget constraint, and "keep
/// <Card>" becomes a pin constraint naming that card.
fn extract_constraints(text: &str) -> Vec<String> {
    let mut constraints = Vec::new();

    if let Some(cap) = BUDGET_PATTERN.captures(text) {
        constraints.push(format!("budget: ${}", &cap[1]));
    }

    for cap in KEEP_PATTERN.captures_iter(text) {
        let card = cap[1].to_string();
        let constraint = format!("keep: {card}");
        if !constraints.contains(&constraint) {
            constraints.push(constraint);
        }
    }

    constraints
}

fn extract_card_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in CARD_NAME_PATTERN.captures_iter(text) {
        let candidate = cap[1].to_string();
        let first_word = candidate.split_whitespace().next().unwrap_or("");
        if candidate.split_whitespace().count() == 1 && SENTENCE_START_STOPWORDS.contains(first_word) {
            continue;
        }
        if !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}
