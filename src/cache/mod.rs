mod card_cache;

pub use card_cache::{CacheStats, CardCache};
