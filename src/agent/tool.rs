use std::sync::Arc;

use async_trait::async_trait;

use crate::repository::CardRepository;
use crate::store::SearchFilters;

use super::model::SearchTool;

/// Arguments the model may pass to the `search_cards` tool. `semantic_query`
/// routes through the Vector Store (or its text-search fallback);
/// `text_query` alone skips straight to an exact filtered search. Every
/// other field narrows either path identically.
#[derive(Debug, Clone, Default)]
pub struct SearchCardsArgs {
    pub semantic_query: Option<String>,
    pub text_query: Option<String>,
    pub colors: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub cmc_min: Option<f64>,
    pub cmc_max: Option<f64>,
    pub limit: Option<usize>,
}

/// A card as handed back to the model: enough to reason about but never the
/// full record, and oracle text is truncated exactly like the tool contract
/// describes (100 characters).
#[derive(Debug, Clone)]
pub struct CardSummary {
    pub name: String,
    pub cmc: f64,
    pub type_line: String,
    pub colors: Vec<String>,
    pub is_legendary: bool,
    pub oracle_text_prefix: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchCardsResult {
    pub cards: Vec<CardSummary>,
    pub count: usize,
}

/// The live `search_cards` tool: backed by the Card Repository, scoped to
/// one format for the duration of an agent invocation.
pub struct RepositorySearchTool {
    repository: Arc<CardRepository>,
    format: String,
    default_limit: usize,
}

impl RepositorySearchTool {
    pub fn new(repository: Arc<CardRepository>, format: impl Into<String>) -> Self {
        Self {
            repository,
            format: format.into(),
            default_limit: 10,
        }
    }
}

#[async_trait]
impl SearchTool for RepositorySearchTool {
    async fn search_cards(&self, args: SearchCardsArgs) -> SearchCardsResult {
        let limit = args.limit.unwrap_or(self.default_limit);
        let filters = SearchFilters {
            colors: args.colors.clone(),
            types: args.types.clone(),
            cmc_min: args.cmc_min,
            cmc_max: args.cmc_max,
            format_legal: Some(self.format.clone()),
            text_query: args.text_query.clone(),
            limit,
            ..SearchFilters::new()
        };

        let result = match &args.semantic_query {
            Some(query) => self.repository.semantic_search(query, Some(&filters), limit).await,
            None => self.repository.search(&filters).await,
        };

        let cards = match result {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(error = %e, "search_cards tool call failed");
                Vec::new()
            }
        };

        let summaries: Vec<CardSummary> = cards
            .iter()
            .map(|c| CardSummary {
                name: c.name.clone(),
                cmc: c.cmc,
                type_line: c.type_line.clone(),
                colors: c.colors.clone(),
                is_legendary: c.is_legendary(),
                oracle_text_prefix: c.oracle_text_prefix(),
            })
            .collect();

        SearchCardsResult {
            count: summaries.len(),
            cards: summaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, Color};
    use crate::store::SqliteCardStore;
    use crate::vector::DisabledVectorStore;

    #[tokio::test]
    async fn tool_truncates_oracle_text_and_scopes_to_format() {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        let mut card = Card::basic_land(Color::Red);
        card.id = "long".into();
        card.name = "Long Text Card".into();
        card.type_line = "Creature — Giant".into();
        card.types = vec!["Creature".into()];
        card.subtypes.clear();
        card.oracle_text = "x".repeat(200);
        card.legalities.insert("standard".into(), "legal".into());
        store.insert_card(&card).await.unwrap();

        let repo = Arc::new(CardRepository::new(store, Arc::new(DisabledVectorStore), 10));
        let tool = RepositorySearchTool::new(repo, "Standard");

        let result = tool
            .search_cards(SearchCardsArgs {
                text_query: Some("x".to_string()),
                ..Default::default()
            })
            .await;

        assert_eq!(result.count, 1);
        assert_eq!(result.cards[0].oracle_text_prefix.len(), 100);
    }

    #[tokio::test]
    async fn tool_returns_empty_on_no_matches_rather_than_erroring() {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        let repo = Arc::new(CardRepository::new(store, Arc::new(DisabledVectorStore), 10));
        let tool = RepositorySearchTool::new(repo, "Standard");

        let result = tool
            .search_cards(SearchCardsArgs {
                text_query: Some("nothing matches this".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(result.count, 0);
    }
}
