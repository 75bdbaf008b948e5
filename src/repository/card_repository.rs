use std::sync::Arc;

use crate::cache::{CacheStats, CardCache};
use crate::model::Card;
use crate::store::{CardStore, SearchFilters};
use crate::vector::VectorStore;

/// The single retrieval façade every higher layer (the tool contract, the
/// Plan Executor's filler search, the demo binary) goes through. Combines
/// the bounded Cache, the exact Card Store, and the Vector Store into one
/// two-tier lookup plus a hybrid semantic search.
pub struct CardRepository {
    cache: CardCache,
    store: Arc<dyn CardStore>,
    vector_store: Arc<dyn VectorStore>,
}

impl CardRepository {
    pub fn new(store: Arc<dyn CardStore>, vector_store: Arc<dyn VectorStore>, cache_capacity: usize) -> Self {
        Self {
            cache: CardCache::new(cache_capacity),
            store,
            vector_store,
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Card>, String> {
        if let Some(card) = self.cache.get(name) {
            return Ok(Some(card));
        }
        match self.store.get_by_name(name).await.map_err(|e| e.to_string())? {
            Some(card) => {
                self.cache.put(name, card.clone());
                Ok(Some(card))
            }
            None => Ok(None),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Card>, String> {
        if let Some(card) = self.cache.get(id) {
            return Ok(Some(card));
        }
        match self.store.get_by_id(id).await.map_err(|e| e.to_string())? {
            Some(card) => {
                self.cache.put(id, card.clone());
                self.cache.put(&card.name, card.clone());
                Ok(Some(card))
            }
            None => Ok(None),
        }
    }

    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Card>, String> {
        let results = self.store.search(filters).await.map_err(|e| e.to_string())?;
        for card in results.iter().take(10) {
            self.cache.put(&card.name, card.clone());
        }
        Ok(results)
    }

    /// Over-fetches `2*limit` candidate ids from the Vector Store, resolves
    /// each through `get_by_id` (so every semantic hit warms the Cache too),
    /// then applies the filters in code. Falls back to a text search when
    /// the Vector Store is disabled, seeding `text_query` from the semantic
    /// query itself so a caller never has to special-case a missing
    /// `filters` argument.
    pub async fn semantic_search(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        limit: usize,
    ) -> Result<Vec<Card>, String> {
        if !self.vector_store.is_enabled() {
            let fallback = match filters {
                Some(f) => {
                    let mut f = f.clone();
                    if f.text_query.is_none() {
                        f.text_query = Some(query.to_string());
                    }
                    f
                }
                None => SearchFilters::with_text_query(query),
            };
            return self.search(&fallback).await;
        }

        let over_fetch = (limit * 2).max(limit);
        let ids = self
            .vector_store
            .search(query, over_fetch, None)
            .await
            .map_err(|e| e.to_string())?;

        let mut cards = Vec::new();
        for id in ids {
            if let Some(card) = self.get_by_id(&id).await? {
                cards.push(card);
            }
        }

        let filtered: Vec<Card> = cards
            .into_iter()
            .filter(|card| match filters {
                Some(f) => matches_filters(card, f),
                None => true,
            })
            .take(limit)
            .collect();

        Ok(filtered)
    }

    pub async fn preload_popular_cards(&self, names: &[String]) -> Result<(), String> {
        for name in names {
            self.get_by_name(name).await?;
        }
        Ok(())
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }
}

fn matches_filters(card: &Card, filters: &SearchFilters) -> bool {
    if let Some(colors) = &filters.colors {
        if !colors.is_empty() && !colors.iter().any(|c| card.colors.contains(c)) {
            return false;
        }
    }
    if let Some(types) = &filters.types {
        if !types.is_empty() && !types.iter().any(|t| card.types.contains(t)) {
            return false;
        }
    }
    if let Some(min) = filters.cmc_min {
        if card.cmc < min {
            return false;
        }
    }
    if let Some(max) = filters.cmc_max {
        if card.cmc > max {
            return false;
        }
    }
    if let Some(format) = &filters.format_legal {
        if !card.is_legal_in(format) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;
    use crate::store::SqliteCardStore;
    use crate::vector::{DisabledVectorStore, InMemoryVectorStore};

    fn bolt() -> Card {
        let mut c = Card::basic_land(Color::Red);
        c.id = "bolt".into();
        c.name = "Lightning Bolt".into();
        c.type_line = "Instant".into();
        c.types = vec!["Instant".into()];
        c.subtypes.clear();
        c.cmc = 1.0;
        c.colors = vec!["R".into()];
        c.oracle_text = "Lightning Bolt deals 3 damage to any target.".into();
        c.legalities.insert("standard".into(), "legal".into());
        c
    }

    #[tokio::test]
    async fn get_by_name_warms_the_cache() {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        store.insert_card(&bolt()).await.unwrap();
        let repo = CardRepository::new(store, Arc::new(DisabledVectorStore), 10);

        assert_eq!(repo.get_cache_stats().misses, 0);
        repo.get_by_name("Lightning Bolt").await.unwrap();
        assert_eq!(repo.get_cache_stats().misses, 1);
        repo.get_by_name("Lightning Bolt").await.unwrap();
        assert_eq!(repo.get_cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn semantic_search_falls_back_to_text_search_when_disabled() {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        store.insert_card(&bolt()).await.unwrap();
        let repo = CardRepository::new(store, Arc::new(DisabledVectorStore), 10);

        let results = repo.semantic_search("deals damage", None, 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Lightning Bolt");
    }

    #[tokio::test]
    async fn semantic_search_resolves_and_filters_vector_hits() {
        let store = Arc::new(SqliteCardStore::open_in_memory().unwrap());
        store.insert_card(&bolt()).await.unwrap();
        let vector_store = Arc::new(InMemoryVectorStore::new());
        vector_store.upsert_cards(&[bolt()]).await.unwrap();
        let repo = CardRepository::new(store, vector_store, 10);

        let filters = SearchFilters {
            colors: Some(vec!["R".to_string()]),
            ..SearchFilters::new()
        };
        let results = repo
            .semantic_search("deals damage to any target", Some(&filters), 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);

        let filters = SearchFilters {
            colors: Some(vec!["U".to_string()]),
            ..SearchFilters::new()
        };
        let results = repo
            .semantic_search("deals damage to any target", Some(&filters), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
