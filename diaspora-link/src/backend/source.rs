//! Traits over the hosted backend.
//!
//! The search core only talks to these traits, so it can be exercised
//! against [`MockBackend`](super::MockBackend) in tests and in local
//! development.

#![allow(async_fn_in_trait)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{SearchEvent, TripViewEvent};
use crate::catalog::{LocationHit, SuggestLimits};
use crate::domain::{
    City, CityId, ContactKind, Country, CountryId, Trip, TripId, ValidatedTrip,
};

use super::error::BackendError;

/// Reference data: cities and countries.
pub trait CatalogSource {
    async fn fetch_countries(&self) -> Result<Vec<Country>, BackendError>;

    async fn fetch_cities(&self) -> Result<Vec<City>, BackendError>;

    /// Case-insensitive substring search, cities first.
    async fn suggest_locations(
        &self,
        query: &str,
        limits: SuggestLimits,
    ) -> Result<Vec<LocationHit>, BackendError>;
}

/// Posted trips and the server-side match classification.
pub trait TripSource {
    /// Active trips within `scope`.
    async fn fetch_active_trips(&self, scope: &TripScope) -> Result<Vec<Trip>, BackendError>;

    /// Trips by id, in no particular order. Unknown ids are ignored.
    async fn fetch_trips(&self, ids: &[TripId]) -> Result<Vec<Trip>, BackendError>;

    async fn classify_trips(
        &self,
        request: &ClassifyRequest,
    ) -> Result<Vec<MatchClassification>, BackendError>;
}

/// Writes: new trips and analytics events.
pub trait TripStore {
    /// Persist a validated trip and return its id.
    async fn create_trip(&self, trip: &ValidatedTrip) -> Result<TripId, BackendError>;

    async fn log_search(&self, event: &SearchEvent) -> Result<(), BackendError>;

    async fn log_trip_view(&self, event: &TripViewEvent) -> Result<(), BackendError>;

    async fn log_contact_click(&self, trip: &TripId, kind: ContactKind)
    -> Result<(), BackendError>;
}

/// Which active trips to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripScope {
    /// Only trips departing on or after this date.
    pub departing_on_or_after: NaiveDate,
    pub origin_country: Option<CountryId>,
    pub destination_country: Option<CountryId>,
}

impl TripScope {
    /// Every active trip departing on or after `date`.
    pub fn departing_from(date: NaiveDate) -> Self {
        Self {
            departing_on_or_after: date,
            origin_country: None,
            destination_country: None,
        }
    }

    /// Restrict to trips whose origin and destination lie in these countries.
    pub fn with_corridor(mut self, origin: CountryId, destination: CountryId) -> Self {
        self.origin_country = Some(origin);
        self.destination_country = Some(destination);
        self
    }

    pub fn admits(&self, trip: &Trip) -> bool {
        trip.departure_date >= self.departing_on_or_after
            && self
                .origin_country
                .is_none_or(|c| trip.origin().place.country == c)
            && self
                .destination_country
                .is_none_or(|c| trip.destination().place.country == c)
    }
}

/// Arguments of the backend's match classification procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifyRequest {
    pub origin_city_id: Option<CityId>,
    pub origin_country_id: CountryId,
    pub destination_city_id: Option<CityId>,
    pub destination_country_id: CountryId,
}

/// How well a trip matches, as decided by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Partial,
    Country,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchClassification {
    pub id: TripId,
    pub match_type: MatchType,
}
