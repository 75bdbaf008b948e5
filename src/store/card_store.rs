use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::Card;

use super::filters::SearchFilters;

/// Error type for Card Store operations, matching the
/// retryable/not-retryable convention used across this crate's outbound
/// clients.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub message: String,
    pub is_retryable: bool,
}

impl StoreError {
    pub fn not_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_retryable: false,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::not_retryable(e.to_string())
    }
}

/// Exact-match and structured-filter lookups over the card catalog.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn get_by_name(&self, name: &str) -> Result<Option<Card>, StoreError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Card>, StoreError>;
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Card>, StoreError>;
    async fn insert_card(&self, card: &Card) -> Result<(), StoreError>;
    async fn bulk_insert_cards(&self, cards: &[Card]) -> Result<(), StoreError>;
    async fn card_count(&self) -> Result<u64, StoreError>;
}

/// SQLite-backed catalog. Colors/types/subtypes/legalities/keywords are
/// stored as JSON text columns (SQLite has no native array type); `cmc` and
/// `rarity` carry real indexes alongside `name` since those are the columns
/// range/equality filters hit most often.
pub struct SqliteCardStore {
    conn: Mutex<Connection>,
}

impl SqliteCardStore {
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                mana_cost TEXT,
                cmc REAL NOT NULL,
                colors TEXT NOT NULL,
                color_identity TEXT NOT NULL,
                type_line TEXT NOT NULL,
                types TEXT NOT NULL,
                subtypes TEXT NOT NULL,
                oracle_text TEXT NOT NULL,
                power TEXT,
                toughness TEXT,
                loyalty TEXT,
                set_code TEXT,
                rarity TEXT,
                legalities TEXT NOT NULL,
                keywords TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(name);
            CREATE INDEX IF NOT EXISTS idx_cards_cmc ON cards(cmc);
            CREATE INDEX IF NOT EXISTS idx_cards_rarity ON cards(rarity);",
        )?;
        Ok(())
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let colors_json: String = row.get("colors")?;
        let color_identity_json: String = row.get("color_identity")?;
        let types_json: String = row.get("types")?;
        let subtypes_json: String = row.get("subtypes")?;
        let legalities_json: String = row.get("legalities")?;
        let keywords_json: String = row.get("keywords")?;

        Ok(Card {
            id: row.get("id")?,
            name: row.get("name")?,
            mana_cost: row.get("mana_cost")?,
            cmc: row.get("cmc")?,
            colors: serde_json::from_str(&colors_json).unwrap_or_default(),
            color_identity: serde_json::from_str(&color_identity_json).unwrap_or_default(),
            type_line: row.get("type_line")?,
            types: serde_json::from_str(&types_json).unwrap_or_default(),
            subtypes: serde_json::from_str(&subtypes_json).unwrap_or_default(),
            oracle_text: row.get("oracle_text")?,
            power: row.get("power")?,
            toughness: row.get("toughness")?,
            loyalty: row.get("loyalty")?,
            set_code: row.get::<_, Option<String>>("set_code")?.unwrap_or_default(),
            rarity: row.get::<_, Option<String>>("rarity")?.unwrap_or_default(),
            legalities: serde_json::from_str(&legalities_json).unwrap_or_default(),
            keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
        })
    }

    fn insert_one(conn: &Connection, card: &Card) -> Result<(), StoreError> {
        conn.execute(
            "INSERT OR REPLACE INTO cards (
                id, name, mana_cost, cmc, colors, color_identity, type_line,
                types, subtypes, oracle_text, power, toughness, loyalty,
                set_code, rarity, legalities, keywords
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)",
            params![
                card.id,
                card.name,
                card.mana_cost,
                card.cmc,
                serde_json::to_string(&card.colors).unwrap_or_default(),
                serde_json::to_string(&card.color_identity).unwrap_or_default(),
                card.type_line,
                serde_json::to_string(&card.types).unwrap_or_default(),
                serde_json::to_string(&card.subtypes).unwrap_or_default(),
                card.oracle_text,
                card.power,
                card.toughness,
                card.loyalty,
                card.set_code,
                card.rarity,
                serde_json::to_string(&card.legalities).unwrap_or_default(),
                serde_json::to_string(&card.keywords).unwrap_or_default(),
            ],
        )?;
        Ok(())
    }

    /// Builds the dynamic WHERE clause for `search`. CMC range, rarity, text,
    /// and format legality are filtered in SQL; colors get a loose
    /// `LIKE`-based prefilter in SQL (cheap to push down, but JSON arrays
    /// can't be matched exactly in SQL) and a strict post-filter in code.
    /// Types are not filtered in SQL at all, only in code, since "Creature"
    /// can appear as a substring of an unrelated subtype string. To
    /// compensate for the in-code post-filter narrowing the SQL result set,
    /// the SQL stage over-fetches by a factor of two before the code filter
    /// runs and the final `limit` is applied.
    fn build_search(filters: &SearchFilters) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut clauses = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(min) = filters.cmc_min {
            clauses.push("cmc >= ?".to_string());
            values.push(Box::new(min));
        }
        if let Some(max) = filters.cmc_max {
            clauses.push("cmc <= ?".to_string());
            values.push(Box::new(max));
        }
        if let Some(rarity) = &filters.rarity {
            clauses.push("LOWER(rarity) = LOWER(?)".to_string());
            values.push(Box::new(rarity.clone()));
        }
        if let Some(text) = &filters.text_query {
            clauses.push("(LOWER(oracle_text) LIKE LOWER(?) OR LOWER(name) LIKE LOWER(?))".to_string());
            let pattern = format!("%{text}%");
            values.push(Box::new(pattern.clone()));
            values.push(Box::new(pattern));
        }
        if let Some(format) = &filters.format_legal {
            clauses.push("LOWER(legalities) LIKE ?".to_string());
            values.push(Box::new(format!("%\"{}\": \"legal\"%", format.to_lowercase())));
        }
        if let Some(colors) = &filters.colors {
            if !colors.is_empty() {
                let color_clauses: Vec<String> = colors
                    .iter()
                    .map(|_| "colors LIKE ?".to_string())
                    .collect();
                clauses.push(format!("({})", color_clauses.join(" OR ")));
                for c in colors {
                    values.push(Box::new(format!("%\"{c}\"%")));
                }
            }
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM cards {where_clause} LIMIT ?"
        );
        values.push(Box::new((filters.limit.max(1) * 2) as i64));

        (sql, values)
    }

    fn post_filter(cards: Vec<Card>, filters: &SearchFilters) -> Vec<Card> {
        cards
            .into_iter()
            .filter(|card| {
                if let Some(colors) = &filters.colors {
                    if !colors.is_empty()
                        && !colors.iter().any(|c| card.colors.contains(c))
                    {
                        return false;
                    }
                }
                if let Some(types) = &filters.types {
                    if !types.is_empty()
                        && !types.iter().any(|t| card.types.contains(t))
                    {
                        return false;
                    }
                }
                true
            })
            .take(filters.limit)
            .collect()
    }
}

#[async_trait]
impl CardStore for SqliteCardStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<Card>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let card = conn
            .query_row(
                "SELECT * FROM cards WHERE LOWER(name) = LOWER(?1)",
                params![name],
                Self::row_to_card,
            )
            .optional()?;
        Ok(card)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Card>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let card = conn
            .query_row(
                "SELECT * FROM cards WHERE id = ?1",
                params![id],
                Self::row_to_card,
            )
            .optional()?;
        Ok(card)
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Card>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let (sql, values) = Self::build_search(filters);
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_card)?;
        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?);
        }
        Ok(Self::post_filter(cards, filters))
    }

    async fn insert_card(&self, card: &Card) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::insert_one(&conn, card)
    }

    async fn bulk_insert_cards(&self, cards: &[Card]) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        for card in cards {
            Self::insert_one(&conn, card)?;
        }
        Ok(())
    }

    async fn card_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Just enough to exercise the store in tests and the demo binary without a
/// live database file: delegates through the same trait as the real store.
pub async fn seed(store: &dyn CardStore, cards: impl IntoIterator<Item = Card>) -> Result<(), StoreError> {
    let cards: Vec<Card> = cards.into_iter().collect();
    store.bulk_insert_cards(&cards).await
}

#[allow(dead_code)]
fn _assert_maps_are_used(_: &HashMap<String, String>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    fn mountain() -> Card {
        let mut card = Card::basic_land(Color::Red);
        card.legalities.insert("standard".into(), "legal".into());
        card
    }

    fn bolt() -> Card {
        let mut card = Card::basic_land(Color::Red);
        card.id = "lightning-bolt".into();
        card.name = "Lightning Bolt".into();
        card.cmc = 1.0;
        card.type_line = "Instant".into();
        card.types = vec!["Instant".into()];
        card.subtypes.clear();
        card.colors = vec!["R".into()];
        card.oracle_text = "Lightning Bolt deals 3 damage to any target.".into();
        card.legalities.insert("standard".into(), "legal".into());
        card
    }

    #[tokio::test]
    async fn round_trips_a_card_by_name_and_id() {
        let store = SqliteCardStore::open_in_memory().unwrap();
        store.insert_card(&bolt()).await.unwrap();

        let by_name = store.get_by_name("lightning bolt").await.unwrap().unwrap();
        assert_eq!(by_name.id, "lightning-bolt");

        let by_id = store.get_by_id("lightning-bolt").await.unwrap().unwrap();
        assert_eq!(by_id.name, "Lightning Bolt");

        assert!(store.get_by_name("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_filters_by_color_and_format_legality() {
        let store = SqliteCardStore::open_in_memory().unwrap();
        store.bulk_insert_cards(&[mountain(), bolt()]).await.unwrap();

        let filters = SearchFilters {
            colors: Some(vec!["R".to_string()]),
            format_legal: Some("Standard".to_string()),
            limit: 10,
            ..SearchFilters::new()
        };
        let results = store.search(&filters).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Lightning Bolt");
    }

    #[tokio::test]
    async fn card_count_reflects_bulk_insert() {
        let store = SqliteCardStore::open_in_memory().unwrap();
        store.bulk_insert_cards(&[mountain(), bolt()]).await.unwrap();
        assert_eq!(store.card_count().await.unwrap(), 2);
    }
}
