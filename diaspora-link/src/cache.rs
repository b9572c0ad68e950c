//! Caching layer for location suggestions.
//!
//! Autocomplete fires on every keystroke, so the same prefixes are looked
//! up over and over. Suggestions are cached per normalised query and
//! language for a short TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::catalog::LocationSuggestion;
use crate::domain::Language;

/// Cache key: (trimmed lowercase query, language).
type SuggestionKey = (String, Language);

/// Cached suggestion list.
type SuggestionEntry = Arc<Vec<LocationSuggestion>>;

/// Configuration for the suggestion cache.
#[derive(Debug, Clone)]
pub struct SuggestionCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl SuggestionCacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for SuggestionCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

/// Cache for localised location suggestions.
#[derive(Clone)]
pub struct SuggestionCache {
    entries: MokaCache<SuggestionKey, SuggestionEntry>,
}

impl SuggestionCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &SuggestionCacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries }
    }

    /// Queries differing only in case or surrounding whitespace share an entry.
    fn key(query: &str, language: Language) -> SuggestionKey {
        (query.trim().to_lowercase(), language)
    }

    pub async fn get(&self, query: &str, language: Language) -> Option<SuggestionEntry> {
        self.entries.get(&Self::key(query, language)).await
    }

    pub async fn insert(&self, query: &str, language: Language, entry: SuggestionEntry) {
        self.entries.insert(Self::key(query, language), entry).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(&SuggestionCacheConfig::default())
    }
}

impl std::fmt::Debug for SuggestionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
