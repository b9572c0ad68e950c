//! Hosted backend access.
//!
//! All persistence lives in a hosted relational backend with a
//! PostgREST-style REST interface. This module provides:
//!
//! - traits describing what the service needs from it ([`CatalogSource`],
//!   [`TripSource`], [`TripStore`]);
//! - [`BackendClient`], the HTTP implementation;
//! - [`MockBackend`], an in-memory implementation for tests and local runs;
//! - [`Backend`], which picks one of the two at startup.

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{BackendClient, BackendConfig};
pub use convert::ConversionError;
pub use error::BackendError;
pub use mock::{AnalyticsLog, ClassifyMode, MockBackend};
pub use source::{
    CatalogSource, ClassifyRequest, MatchClassification, MatchType, TripScope, TripSource,
    TripStore,
};

use crate::analytics::{SearchEvent, TripViewEvent};
use crate::catalog::{LocationHit, SuggestLimits};
use crate::domain::{City, ContactKind, Country, Trip, TripId, ValidatedTrip};

/// The backend chosen at startup.
#[derive(Debug, Clone)]
pub enum Backend {
    Remote(BackendClient),
    Mock(MockBackend),
}

impl CatalogSource for Backend {
    async fn fetch_countries(&self) -> Result<Vec<Country>, BackendError> {
        match self {
            Backend::Remote(c) => c.fetch_countries().await,
            Backend::Mock(m) => m.fetch_countries().await,
        }
    }

    async fn fetch_cities(&self) -> Result<Vec<City>, BackendError> {
        match self {
            Backend::Remote(c) => c.fetch_cities().await,
            Backend::Mock(m) => m.fetch_cities().await,
        }
    }

    async fn suggest_locations(
        &self,
        query: &str,
        limits: SuggestLimits,
    ) -> Result<Vec<LocationHit>, BackendError> {
        match self {
            Backend::Remote(c) => c.suggest_locations(query, limits).await,
            Backend::Mock(m) => m.suggest_locations(query, limits).await,
        }
    }
}

impl TripSource for Backend {
    async fn fetch_active_trips(&self, scope: &TripScope) -> Result<Vec<Trip>, BackendError> {
        match self {
            Backend::Remote(c) => c.fetch_active_trips(scope).await,
            Backend::Mock(m) => m.fetch_active_trips(scope).await,
        }
    }

    async fn fetch_trips(&self, ids: &[TripId]) -> Result<Vec<Trip>, BackendError> {
        match self {
            Backend::Remote(c) => c.fetch_trips(ids).await,
            Backend::Mock(m) => m.fetch_trips(ids).await,
        }
    }

    async fn classify_trips(
        &self,
        request: &ClassifyRequest,
    ) -> Result<Vec<MatchClassification>, BackendError> {
        match self {
            Backend::Remote(c) => c.classify_trips(request).await,
            Backend::Mock(m) => m.classify_trips(request).await,
        }
    }
}

impl TripStore for Backend {
    async fn create_trip(&self, trip: &ValidatedTrip) -> Result<TripId, BackendError> {
        match self {
            Backend::Remote(c) => c.create_trip(trip).await,
            Backend::Mock(m) => m.create_trip(trip).await,
        }
    }

    async fn log_search(&self, event: &SearchEvent) -> Result<(), BackendError> {
        match self {
            Backend::Remote(c) => c.log_search(event).await,
            Backend::Mock(m) => m.log_search(event).await,
        }
    }

    async fn log_trip_view(&self, event: &TripViewEvent) -> Result<(), BackendError> {
        match self {
            Backend::Remote(c) => c.log_trip_view(event).await,
            Backend::Mock(m) => m.log_trip_view(event).await,
        }
    }

    async fn log_contact_click(
        &self,
        trip: &TripId,
        kind: ContactKind,
    ) -> Result<(), BackendError> {
        match self {
            Backend::Remote(c) => c.log_contact_click(trip, kind).await,
            Backend::Mock(m) => m.log_contact_click(trip, kind).await,
        }
    }
}
