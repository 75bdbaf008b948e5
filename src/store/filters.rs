/// The cross-product of search dimensions the Card Store and Vector Store
/// both understand. Every field is optional; an empty filter set matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub colors: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub cmc_min: Option<f64>,
    pub cmc_max: Option<f64>,
    pub rarity: Option<String>,
    pub format_legal: Option<String>,
    pub text_query: Option<String>,
    pub limit: usize,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self {
            limit: 100,
            ..Default::default()
        }
    }

    pub fn with_text_query(query: impl Into<String>) -> Self {
        Self {
            text_query: Some(query.into()),
            ..Self::new()
        }
    }
}
