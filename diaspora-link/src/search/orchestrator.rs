//! Trip search service.
//!
//! A search first asks the backend to classify trips for the two resolved
//! locations. When that is not possible it falls back to filtering active
//! trips locally against the location catalog. Searches never fail: any
//! error is logged and yields an empty result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::backend::{
    BackendError, CatalogSource, ClassifyRequest, MatchType, TripScope, TripSource, TripStore,
};
use crate::cache::{SuggestionCache, SuggestionCacheConfig};
use crate::catalog::{CatalogCache, CatalogError, LocationCatalog, LocationHit, LocationSuggestion};
use crate::domain::{Language, NewTrip, Trip, TripId, ValidationErrors};

use super::config::{FallbackScope, SearchConfig};
use super::filter::{NearestPair, filter_trips};
use super::matcher::SearchLocation;
use super::rank::{rank_country_matches, sort_by_departure};
use super::resolver::{LocationResolver, ResolvedLocation};
use super::tracker::RequestTracker;

/// Error from the fallback search path. Never returned by
/// [`SearchService::search`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Error from trip creation.
#[derive(Debug, thiserror::Error)]
pub enum CreateTripError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("location catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to save trip: {0}")]
    Backend(#[from] BackendError),
}

/// A search as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub language: Language,
}

impl SearchQuery {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Display names of the searched countries, empty for an absent side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchCountries {
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Trips serving both searched locations, earliest first.
    pub exact_matches: Vec<Trip>,
    /// Trips touching both searched countries, best first.
    pub country_matches: Vec<Trip>,
    pub search_countries: SearchCountries,
    /// Set when `exact_matches` holds trips for the nearest served cities.
    pub nearest: Option<NearestPair>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.exact_matches.len() + self.country_matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Trip search over a backend.
pub struct SearchService<S> {
    source: S,
    catalog: CatalogCache,
    suggestions: SuggestionCache,
    config: SearchConfig,
    searches: RequestTracker,
    lookups: RequestTracker,
}

impl<S> SearchService<S> {
    pub fn new(source: S, catalog: CatalogCache, config: SearchConfig) -> Self {
        Self {
            source,
            catalog,
            suggestions: SuggestionCache::default(),
            config,
            searches: RequestTracker::new(),
            lookups: RequestTracker::new(),
        }
    }

    pub fn with_suggestion_cache(mut self, config: &SuggestionCacheConfig) -> Self {
        self.suggestions = SuggestionCache::new(config);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn suggestion_cache(&self) -> &SuggestionCache {
        &self.suggestions
    }
}

impl<S: CatalogSource> SearchService<S> {
    /// The location catalog, loading it on first use.
    pub async fn catalog(&self) -> Result<Arc<LocationCatalog>, CatalogError> {
        self.catalog.get_or_load(&self.source).await
    }

    /// Autocomplete suggestions for a partial location name.
    ///
    /// Short queries return nothing without touching the backend. Backend
    /// failures yield an empty list, which is not cached.
    pub async fn suggest(&self, query: &str, language: Language) -> Arc<Vec<LocationSuggestion>> {
        if !self.config.accepts_query(query) {
            return Arc::default();
        }
        if let Some(cached) = self.suggestions.get(query, language).await {
            return cached;
        }

        match self
            .source
            .suggest_locations(query.trim(), self.config.suggest_limits)
            .await
        {
            Ok(hits) => {
                let entry = Arc::new(hits.iter().map(|h| h.localize(language)).collect::<Vec<_>>());
                self.suggestions.insert(query, language, entry.clone()).await;
                entry
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "location suggestion failed");
                Arc::default()
            }
        }
    }

    /// Like [`suggest`](Self::suggest), but `None` if a newer lookup
    /// started before this one finished.
    pub async fn suggest_latest(
        &self,
        query: &str,
        language: Language,
    ) -> Option<Arc<Vec<LocationSuggestion>>> {
        self.lookups.run_latest(self.suggest(query, language)).await
    }

    async fn first_hit(&self, query: &str) -> Result<Option<LocationHit>, BackendError> {
        if !self.config.accepts_query(query) {
            return Ok(None);
        }
        let hits = self
            .source
            .suggest_locations(query, self.config.suggest_limits)
            .await?;
        Ok(hits.into_iter().next())
    }
}

impl<S: CatalogSource + TripSource> SearchService<S> {
    /// Search for trips between two free-text locations.
    pub async fn search(&self, query: &SearchQuery) -> SearchResults {
        let origin = query.origin.trim();
        let destination = query.destination.trim();
        if origin.is_empty() && destination.is_empty() {
            return SearchResults::default();
        }

        if let Some(results) = self.classified_search(origin, destination, query.language).await {
            tracing::info!(
                origin,
                destination,
                exact = results.exact_matches.len(),
                country = results.country_matches.len(),
                "search answered by backend classification"
            );
            return results;
        }

        let today = chrono::Local::now().date_naive();
        match self
            .filtered_search(origin, destination, query.language, today)
            .await
        {
            Ok(results) => {
                tracing::info!(
                    origin,
                    destination,
                    exact = results.exact_matches.len(),
                    country = results.country_matches.len(),
                    nearest = results.nearest.is_some(),
                    "search answered by local filter"
                );
                results
            }
            Err(e) => {
                tracing::warn!(origin, destination, error = %e, "search failed");
                SearchResults::default()
            }
        }
    }

    /// Like [`search`](Self::search), but `None` if a newer search started
    /// before this one finished.
    pub async fn search_latest(&self, query: &SearchQuery) -> Option<SearchResults> {
        self.searches.run_latest(self.search(query)).await
    }

    /// A single trip by id, whatever its status.
    pub async fn trip(&self, id: &TripId) -> Result<Option<Trip>, BackendError> {
        let trips = self.source.fetch_trips(std::slice::from_ref(id)).await?;
        Ok(trips.into_iter().find(|t| &t.id == id))
    }

    /// The primary path: backend resolution and classification.
    ///
    /// `None` means the local filter should answer instead.
    async fn classified_search(
        &self,
        origin: &str,
        destination: &str,
        language: Language,
    ) -> Option<SearchResults> {
        if origin.is_empty() || destination.is_empty() {
            return None;
        }

        let (origin_hit, destination_hit) =
            match futures::try_join!(self.first_hit(origin), self.first_hit(destination)) {
                Ok((Some(o), Some(d))) => (o, d),
                Ok(_) => {
                    tracing::debug!(origin, destination, "backend could not resolve both sides");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "location lookup failed");
                    return None;
                }
            };

        let request = ClassifyRequest {
            origin_city_id: origin_hit.city_id(),
            origin_country_id: origin_hit.country_id(),
            destination_city_id: destination_hit.city_id(),
            destination_country_id: destination_hit.country_id(),
        };
        let classified = match self.source.classify_trips(&request).await {
            Ok(rows) if rows.is_empty() => {
                tracing::debug!("classification returned no trips");
                return None;
            }
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "trip classification failed");
                return None;
            }
        };

        let ids: Vec<TripId> = classified.iter().map(|c| c.id.clone()).collect();
        let mut trips: HashMap<TripId, Trip> = match self.source.fetch_trips(&ids).await {
            Ok(trips) => trips.into_iter().map(|t| (t.id.clone(), t)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch classified trips");
                return None;
            }
        };

        let mut results = SearchResults {
            search_countries: SearchCountries {
                origin: origin_hit.country_name(language).to_string(),
                destination: destination_hit.country_name(language).to_string(),
            },
            ..Default::default()
        };
        for row in classified {
            let Some(trip) = trips.remove(&row.id) else {
                continue;
            };
            match row.match_type {
                MatchType::Exact | MatchType::Partial => results.exact_matches.push(trip),
                MatchType::Country => results.country_matches.push(trip),
            }
        }
        sort_by_departure(&mut results.exact_matches);
        sort_by_departure(&mut results.country_matches);
        Some(results)
    }

    /// The fallback path: resolve against the catalog, then filter and
    /// rank active trips locally.
    async fn filtered_search(
        &self,
        origin: &str,
        destination: &str,
        language: Language,
        today: NaiveDate,
    ) -> Result<SearchResults, SearchError> {
        let catalog = self.catalog().await?;
        let resolver = LocationResolver::new(&catalog, &self.config);
        let resolve = |q: &str| (!q.is_empty()).then(|| resolver.resolve(q)).flatten();
        let resolved_origin = resolve(origin);
        let resolved_destination = resolve(destination);

        let search_countries = SearchCountries {
            origin: country_name(resolved_origin.as_ref(), language),
            destination: country_name(resolved_destination.as_ref(), language),
        };
        let origin_location = resolved_origin.as_ref().map(SearchLocation::from);
        let destination_location = resolved_destination.as_ref().map(SearchLocation::from);

        if origin_location.is_none() && destination_location.is_none() {
            tracing::debug!(origin, destination, "no location resolved");
            return Ok(SearchResults {
                search_countries,
                ..Default::default()
            });
        }

        let mut scope = TripScope::departing_from(today);
        if let (FallbackScope::Corridor, Some(o), Some(d)) = (
            self.config.fallback_scope,
            &origin_location,
            &destination_location,
        ) {
            scope = scope.with_corridor(o.country(), d.country());
        }
        let trips = self.source.fetch_active_trips(&scope).await?;

        let outcome = filter_trips(
            &trips,
            origin_location.as_ref(),
            destination_location.as_ref(),
            &catalog,
        );

        let mut exact_matches = outcome.exact;
        sort_by_departure(&mut exact_matches);
        let country_matches = match (&origin_location, &destination_location) {
            (Some(o), Some(d)) => rank_country_matches(outcome.country, o, d),
            _ => Vec::new(),
        };

        Ok(SearchResults {
            exact_matches,
            country_matches,
            search_countries,
            nearest: outcome.nearest,
        })
    }
}

fn country_name(location: Option<&ResolvedLocation>, language: Language) -> String {
    location
        .map(|l| l.country_name(language).to_string())
        .unwrap_or_default()
}

impl<S: CatalogSource + TripStore> SearchService<S> {
    /// Validate and persist a new trip.
    ///
    /// Nothing is written unless validation passes.
    pub async fn create_trip(&self, trip: &NewTrip) -> Result<TripId, CreateTripError> {
        let catalog = self.catalog().await?;
        let today = chrono::Local::now().date_naive();
        let validated = trip.validate(today, |city| catalog.country_of(city))?;

        let id = self.source.create_trip(&validated).await?;
        tracing::info!(
            trip_id = %id,
            stops = validated.stops.len(),
            departure = %validated.departure_date,
            "created trip"
        );
        Ok(id)
    }
}
