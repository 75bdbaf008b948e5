mod rules;

pub use rules::{ArchetypeLandCounts, FormatRules, FormatSpec};
