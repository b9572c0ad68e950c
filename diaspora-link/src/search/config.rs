//! Search configuration.

use crate::catalog::SuggestLimits;

/// Which active trips the client-side fallback considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackScope {
    /// Trips whose origin and destination countries equal the searched
    /// countries. Reverse-direction trips and trips that only pass through
    /// a searched country at an intermediate stop are never fetched, so
    /// they cannot appear among country matches.
    #[default]
    Corridor,
    /// Every active trip.
    AllActive,
}

/// Configuration parameters for trip search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Queries shorter than this (after trimming) are never resolved.
    pub min_query_chars: usize,

    /// Maximum autocomplete suggestions per kind.
    pub suggest_limits: SuggestLimits,

    /// Which trips the fallback path fetches.
    pub fallback_scope: FallbackScope,
}

impl SearchConfig {
    pub fn with_min_query_chars(mut self, n: usize) -> Self {
        self.min_query_chars = n;
        self
    }

    pub fn with_suggest_limits(mut self, limits: SuggestLimits) -> Self {
        self.suggest_limits = limits;
        self
    }

    pub fn with_fallback_scope(mut self, scope: FallbackScope) -> Self {
        self.fallback_scope = scope;
        self
    }

    /// Whether `query` is long enough to look up.
    pub fn accepts_query(&self, query: &str) -> bool {
        let len = query.trim().chars().count();
        len > 0 && len >= self.min_query_chars
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 1,
            suggest_limits: SuggestLimits::default(),
            fallback_scope: FallbackScope::default(),
        }
    }
}
