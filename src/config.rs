use std::env;

const DEFAULT_MODEL_ENV: &str = "DEFAULT_MODEL";
const CACHE_L2_MAX_SIZE_ENV: &str = "CACHE_L2_MAX_SIZE";
const DB_PATH_ENV: &str = "MTG_DB_PATH";
const VECTOR_STORE_ENABLED_ENV: &str = "MTG_VECTOR_STORE_ENABLED";

const DEFAULT_MODEL_FALLBACK: &str = "openai:gpt-4o-mini";
const DEFAULT_CACHE_L2_MAX_SIZE: usize = 1000;

/// Environment-driven settings, read once at orchestrator construction.
/// Every field degrades to a usable default rather than erroring, matching
/// this crate's general posture of preferring a degraded fallback over a
/// hard failure for anything outside the request itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub default_model: String,
    pub cache_l2_max_size: usize,
    pub db_path: Option<String>,
    pub vector_store_enabled: bool,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            default_model: env::var(DEFAULT_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL_FALLBACK.to_string()),
            cache_l2_max_size: env::var(CACHE_L2_MAX_SIZE_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_L2_MAX_SIZE),
            db_path: env::var(DB_PATH_ENV).ok(),
            vector_store_enabled: env::var(VECTOR_STORE_ENABLED_ENV)
                .ok()
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
        }
    }

    pub fn has_llm_credentials(&self) -> bool {
        self.openai_api_key.is_some() || self.anthropic_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL_FALLBACK.to_string(),
            cache_l2_max_size: DEFAULT_CACHE_L2_MAX_SIZE,
            db_path: None,
            vector_store_enabled: true,
            openai_api_key: None,
            anthropic_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_any_environment_set() {
        let config = Config::default();
        assert_eq!(config.cache_l2_max_size, 1000);
        assert!(config.vector_store_enabled);
        assert!(!config.has_llm_credentials());
    }
}
