use std::collections::HashMap;

use crate::error::OrchestratorError;

/// Deck-construction rules for one named format. Every numeric constant a
/// prompt, the Plan Executor, or the Quality Verifier needs comes from this
/// table; nothing downstream hand-codes a format-specific number.
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    pub deck_size: u32,
    pub copy_limit: u32,
    pub singleton: bool,
    pub legendary_max: u32,
    pub land_ratio: f64,
}

/// Land counts recommended per archetype, used to size the Plan Executor's
/// land distribution.
#[derive(Debug, Clone, Copy)]
pub struct ArchetypeLandCounts {
    pub aggro: u32,
    pub midrange: u32,
    pub control: u32,
    pub combo: u32,
}

impl ArchetypeLandCounts {
    fn for_archetype(&self, archetype: &str) -> u32 {
        match archetype.to_lowercase().as_str() {
            "aggro" => self.aggro,
            "control" => self.control,
            "combo" => self.combo,
            _ => self.midrange,
        }
    }
}

const SIXTY_CARD_LAND_COUNTS: ArchetypeLandCounts = ArchetypeLandCounts {
    aggro: 22,
    midrange: 24,
    control: 26,
    combo: 23,
};

const COMMANDER_LAND_COUNTS: ArchetypeLandCounts = ArchetypeLandCounts {
    aggro: 35,
    midrange: 36,
    control: 38,
    combo: 35,
};

/// Per-integer-CMC target share of a 60-card deck's spells, 0 through 6
/// (6 folds in everything 6 CMC or higher). Lifted verbatim from the
/// hardcoded ideal distribution the original verifier scores against.
const SIXTY_CARD_CURVE: [(u32, f64); 7] = [
    (0, 0.05),
    (1, 0.15),
    (2, 0.25),
    (3, 0.25),
    (4, 0.15),
    (5, 0.10),
    (6, 0.05),
];

/// Commander's curve skews higher than 60-card formats (higher average CMC,
/// fewer cheap interaction pieces relative to bombs and ramp payoffs), but
/// still sums to 1.0 across the same seven buckets.
const COMMANDER_CURVE: [(u32, f64); 7] = [
    (0, 0.03),
    (1, 0.10),
    (2, 0.20),
    (3, 0.22),
    (4, 0.20),
    (5, 0.15),
    (6, 0.10),
];

fn sixty_card_spec(legendary_max: u32) -> FormatSpec {
    FormatSpec {
        deck_size: 60,
        copy_limit: 4,
        singleton: false,
        legendary_max,
        land_ratio: 0.40,
    }
}

fn commander_spec() -> FormatSpec {
    FormatSpec {
        deck_size: 100,
        copy_limit: 1,
        singleton: true,
        legendary_max: 1,
        land_ratio: 0.37,
    }
}

/// Static lookup table. All methods are case-insensitive over the format
/// name and pure (no I/O, no interior mutability).
pub struct FormatRules;

impl FormatRules {
    fn known_formats() -> &'static [&'static str] {
        &[
            "standard",
            "modern",
            "pioneer",
            "legacy",
            "vintage",
            "brawl",
            "commander",
        ]
    }

    fn spec(format: &str) -> Result<FormatSpec, OrchestratorError> {
        match format.to_lowercase().as_str() {
            "standard" | "modern" | "pioneer" | "legacy" | "vintage" => Ok(sixty_card_spec(3)),
            "brawl" => Ok(sixty_card_spec(1)),
            "commander" => Ok(commander_spec()),
            other => Err(OrchestratorError::UnknownFormat(format!(
                "{other}. Supported formats: {:?}",
                Self::known_formats()
            ))),
        }
    }

    pub fn get_deck_size(format: &str) -> Result<u32, OrchestratorError> {
        Self::spec(format).map(|s| s.deck_size)
    }

    pub fn get_copy_limit(format: &str) -> Result<u32, OrchestratorError> {
        Self::spec(format).map(|s| s.copy_limit)
    }

    pub fn is_singleton(format: &str) -> Result<bool, OrchestratorError> {
        Self::spec(format).map(|s| s.singleton)
    }

    pub fn get_legendary_max(format: &str) -> Result<u32, OrchestratorError> {
        Self::spec(format).map(|s| s.legendary_max)
    }

    pub fn get_land_ratio(format: &str) -> Result<f64, OrchestratorError> {
        Self::spec(format).map(|s| s.land_ratio)
    }

    fn land_counts(format: &str) -> Result<ArchetypeLandCounts, OrchestratorError> {
        match format.to_lowercase().as_str() {
            "commander" => Ok(COMMANDER_LAND_COUNTS),
            _ => {
                // Validates the format is known, then shares the flat
                // 60-card table.
                Self::spec(format)?;
                Ok(SIXTY_CARD_LAND_COUNTS)
            }
        }
    }

    pub fn get_land_count(format: &str, archetype: &str) -> Result<u32, OrchestratorError> {
        Self::land_counts(format).map(|counts| counts.for_archetype(archetype))
    }

    fn curve_table(format: &str) -> Result<[(u32, f64); 7], OrchestratorError> {
        match format.to_lowercase().as_str() {
            "commander" => Ok(COMMANDER_CURVE),
            _ => {
                Self::spec(format)?;
                Ok(SIXTY_CARD_CURVE)
            }
        }
    }

    /// Per-integer-CMC (0 through 6, where 6 represents "6 or more") target
    /// share of the deck's spells. The literal hardcoded table, not a value
    /// derived by splitting coarser brackets in half.
    pub fn get_mana_curve_targets(format: &str) -> Result<HashMap<u32, f64>, OrchestratorError> {
        Ok(Self::curve_table(format)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_and_brawl_share_size_but_differ_on_legendary_max() {
        assert_eq!(FormatRules::get_deck_size("Standard").unwrap(), 60);
        assert_eq!(FormatRules::get_legendary_max("standard").unwrap(), 3);
        assert_eq!(FormatRules::get_legendary_max("BRAWL").unwrap(), 1);
    }

    #[test]
    fn commander_is_singleton_at_one_hundred_cards() {
        assert_eq!(FormatRules::get_deck_size("commander").unwrap(), 100);
        assert!(FormatRules::is_singleton("Commander").unwrap());
        assert_eq!(FormatRules::get_copy_limit("Commander").unwrap(), 1);
        assert_eq!(
            FormatRules::get_land_ratio("Commander").unwrap(),
            0.37
        );
    }

    #[test]
    fn land_counts_are_archetype_aware_for_commander() {
        assert_eq!(
            FormatRules::get_land_count("Commander", "Aggro").unwrap(),
            35
        );
        assert_eq!(
            FormatRules::get_land_count("Commander", "Control").unwrap(),
            38
        );
        assert_eq!(
            FormatRules::get_land_count("Standard", "Midrange").unwrap(),
            24
        );
        // Unknown archetype defaults to midrange, matching the source.
        assert_eq!(
            FormatRules::get_land_count("Standard", "Tempo").unwrap(),
            24
        );
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert!(FormatRules::get_deck_size("Pauper").is_err());
    }

    #[test]
    fn curve_targets_sum_to_one() {
        let targets = FormatRules::get_mana_curve_targets("Standard").unwrap();
        let sum: f64 = targets.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let targets = FormatRules::get_mana_curve_targets("Commander").unwrap();
        let sum: f64 = targets.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
