mod card_store;
mod filters;

pub use card_store::{seed, CardStore, SqliteCardStore, StoreError};
pub use filters::SearchFilters;
