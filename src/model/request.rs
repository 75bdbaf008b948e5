use serde::{Deserialize, Serialize};

/// An incoming request to build a new deck from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub format: String,
    pub colors: Vec<String>,
    pub archetype: String,
    #[serde(default)]
    pub strategy: String,
    /// 0 means "use the format's default size".
    #[serde(default)]
    pub deck_size: u32,
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_quality_threshold() -> f64 {
    0.7
}

fn default_max_iterations() -> u32 {
    5
}

impl BuildRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.colors.is_empty() {
            return Err("at least one color must be requested".to_string());
        }
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(format!(
                "quality_threshold must be in [0,1], got {}",
                self.quality_threshold
            ));
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".to_string());
        }
        Ok(())
    }
}

/// The five intent categories a free-form modification prompt is classified
/// into, mirroring the taxonomy used to prompt the original system's LLM
/// intent parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentType {
    Add,
    Remove,
    Replace,
    Optimize,
    StrategyShift,
}

impl IntentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Add => "add",
            IntentType::Remove => "remove",
            IntentType::Replace => "replace",
            IntentType::Optimize => "optimize",
            IntentType::StrategyShift => "strategy_shift",
        }
    }
}

/// Output of the Intent Parser: a structured reading of a free-form
/// modification prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub intent_type: IntentType,
    pub description: String,
    pub card_changes: Vec<String>,
    pub constraints: Vec<String>,
    pub confidence: f64,
}
