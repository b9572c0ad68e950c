//! In-memory backend for tests and local development.
//!
//! Serves reference data and trips from memory, optionally loaded from
//! JSON fixtures in the backend's own row format, and records every write
//! so tests can inspect it.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;

use crate::analytics::{SearchEvent, TripViewEvent};
use crate::catalog::{LocationCatalog, LocationHit, SuggestLimits};
use crate::domain::{City, ContactKind, Country, Trip, TripId, ValidatedTrip};

use super::convert::{city_from_row, country_from_row, new_url_id, new_username, trip_from_row};
use super::error::BackendError;
use super::source::{
    CatalogSource, ClassifyRequest, MatchClassification, TripScope, TripSource, TripStore,
};
use super::types::{CityRow, CountryRow, TripRow};

/// How the mock answers the match classification procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassifyMode {
    /// Fail as if the procedure were not deployed.
    #[default]
    Unavailable,
    /// Return these classifications for every request.
    Fixed(Vec<MatchClassification>),
}

/// Everything written through [`TripStore`]'s analytics methods.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsLog {
    pub searches: Vec<SearchEvent>,
    pub views: Vec<TripViewEvent>,
    pub contact_clicks: Vec<(TripId, ContactKind)>,
}

#[derive(Debug, Default)]
struct MockState {
    trips: Vec<Trip>,
    inactive: HashSet<TripId>,
    classify: ClassifyMode,
    analytics: AnalyticsLog,
    created: usize,
}

/// Mock backend serving data from memory.
///
/// Clones share state. Every trait call is counted, including failed ones.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    catalog: Arc<LocationCatalog>,
    state: Arc<Mutex<MockState>>,
    calls: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new(countries: Vec<Country>, cities: Vec<City>, trips: Vec<Trip>) -> Self {
        Self {
            catalog: Arc::new(LocationCatalog::new(countries, cities)),
            state: Arc::new(Mutex::new(MockState {
                trips,
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    /// Load fixtures from a directory.
    ///
    /// Expects `countries.json` and `cities.json`, and optionally
    /// `trips.json`, each an array of backend rows. Trips whose status is
    /// not `active` are kept but never returned as active.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, BackendError> {
        let data_dir = data_dir.as_ref();

        let countries: Vec<CountryRow> = read_fixture(&data_dir.join("countries.json"))?;
        let cities: Vec<CityRow> = read_fixture(&data_dir.join("cities.json"))?;
        let trip_rows: Vec<TripRow> = {
            let path = data_dir.join("trips.json");
            if path.exists() {
                read_fixture(&path)?
            } else {
                Vec::new()
            }
        };

        let mut trips = Vec::with_capacity(trip_rows.len());
        let mut inactive = HashSet::new();
        for row in trip_rows {
            let active = row.is_active();
            match trip_from_row(row) {
                Ok(trip) => {
                    if !active {
                        inactive.insert(trip.id.clone());
                    }
                    trips.push(trip);
                }
                Err(e) => tracing::warn!(error = %e, "skipping fixture trip"),
            }
        }

        tracing::info!(
            dir = %data_dir.display(),
            countries = countries.len(),
            cities = cities.len(),
            trips = trips.len(),
            "loaded mock backend fixtures"
        );

        let backend = Self::new(
            countries.into_iter().map(country_from_row).collect(),
            cities.into_iter().map(city_from_row).collect(),
            trips,
        );
        backend.lock().inactive = inactive;
        Ok(backend)
    }

    pub fn with_classification(self, mode: ClassifyMode) -> Self {
        self.set_classification(mode);
        self
    }

    pub fn set_classification(&self, mode: ClassifyMode) {
        self.lock().classify = mode;
    }

    /// Mark a trip as no longer active.
    pub fn deactivate(&self, id: &TripId) {
        self.lock().inactive.insert(id.clone());
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of trait calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn analytics(&self) -> AnalyticsLog {
        self.lock().analytics.clone()
    }

    /// All stored trips, including created and inactive ones.
    pub fn trips(&self) -> Vec<Trip> {
        self.lock().trips.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count a call and fail if the backend is marked unavailable.
    fn begin(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 503,
                message: "mock backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn read_fixture<T: DeserializeOwned>(path: &Path) -> Result<T, BackendError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        BackendError::NotConfigured(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&json).map_err(|e| BackendError::Json {
        message: format!("failed to parse {}: {e}", path.display()),
        body: None,
    })
}

impl CatalogSource for MockBackend {
    async fn fetch_countries(&self) -> Result<Vec<Country>, BackendError> {
        self.begin()?;
        Ok(self.catalog.countries().to_vec())
    }

    async fn fetch_cities(&self) -> Result<Vec<City>, BackendError> {
        self.begin()?;
        Ok(self.catalog.cities().to_vec())
    }

    async fn suggest_locations(
        &self,
        query: &str,
        limits: SuggestLimits,
    ) -> Result<Vec<LocationHit>, BackendError> {
        self.begin()?;
        Ok(self.catalog.suggest(query, limits))
    }
}

impl TripSource for MockBackend {
    async fn fetch_active_trips(&self, scope: &TripScope) -> Result<Vec<Trip>, BackendError> {
        self.begin()?;
        let state = self.lock();
        let mut trips: Vec<Trip> = state
            .trips
            .iter()
            .filter(|t| !state.inactive.contains(&t.id) && scope.admits(t))
            .cloned()
            .collect();
        trips.sort_by_key(|t| t.departure_date);
        Ok(trips)
    }

    async fn fetch_trips(&self, ids: &[TripId]) -> Result<Vec<Trip>, BackendError> {
        self.begin()?;
        Ok(self
            .lock()
            .trips
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn classify_trips(
        &self,
        _request: &ClassifyRequest,
    ) -> Result<Vec<MatchClassification>, BackendError> {
        self.begin()?;
        match &self.lock().classify {
            ClassifyMode::Unavailable => Err(BackendError::Api {
                status: 404,
                message: "function search_trips_with_match_type not found".to_string(),
            }),
            ClassifyMode::Fixed(rows) => Ok(rows.clone()),
        }
    }
}

impl TripStore for MockBackend {
    async fn create_trip(&self, trip: &ValidatedTrip) -> Result<TripId, BackendError> {
        self.begin()?;
        let mut state = self.lock();
        state.created += 1;
        let id = TripId::new(format!("mock-{}", state.created));

        let trip = trip
            .clone()
            .into_trip(id.clone(), new_username(&trip.full_name), new_url_id())
            .map_err(|e| BackendError::Api {
                status: 400,
                message: e.to_string(),
            })?;
        state.trips.push(trip);
        Ok(id)
    }

    async fn log_search(&self, event: &SearchEvent) -> Result<(), BackendError> {
        self.begin()?;
        self.lock().analytics.searches.push(event.clone());
        Ok(())
    }

    async fn log_trip_view(&self, event: &TripViewEvent) -> Result<(), BackendError> {
        self.begin()?;
        self.lock().analytics.views.push(event.clone());
        Ok(())
    }

    async fn log_contact_click(
        &self,
        trip: &TripId,
        kind: ContactKind,
    ) -> Result<(), BackendError> {
        self.begin()?;
        self.lock()
            .analytics
            .contact_clicks
            .push((trip.clone(), kind));
        Ok(())
    }
}
