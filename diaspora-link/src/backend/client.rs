//! HTTP client for the hosted backend's REST interface.
//!
//! Handles authentication, status mapping, and conversion of rows to
//! domain types. Each public operation is a single request, apart from
//! trip creation which writes the carrier, trip, stops and contacts in
//! sequence.

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::analytics::{SearchEvent, TripViewEvent};
use crate::catalog::{LocationHit, SuggestLimits};
use crate::domain::{City, ContactKind, Country, Trip, TripId, ValidatedTrip};

use super::convert::{
    carrier_insert, city_from_row, city_hit_from_row, contact_inserts, country_from_row,
    country_hit_from_row, new_url_id, new_username, stop_inserts, trip_insert, trips_from_rows,
};
use super::error::BackendError;
use super::source::{
    CatalogSource, ClassifyRequest, MatchClassification, TripScope, TripSource, TripStore,
};
use super::types::{
    CityHitRow, CityRow, ContactClickUpsert, CountryRow, InsertedRow, MatchRow, RowId,
    SearchLogInsert, TripRow, TripViewInsert,
};

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Columns fetched for every trip, with stops, contacts and carrier embedded.
const TRIP_SELECT: &str = "id,url_id,departure_date,price_per_kg,currency,available_kg,notes,status,\
origin_city_id,origin_country_id,destination_city_id,destination_country_id,\
carrier:carriers(full_name,username),\
trip_stops(stop_order,stop_type,city_id,country_id,address,availability_time,instructions),\
trip_contacts(contact_type,contact_value,contact_label)";

const CITY_SELECT: &str = "id,name_en,name_fr,name_ar,country_id,latitude,longitude,aliases";

const COUNTRY_SELECT: &str = "id,name_en,name_fr,name_ar,iso_code,flag_emoji";

const RETURN_ROWS: &str = "return=representation";
const RETURN_NOTHING: &str = "return=minimal";
const UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://example.supabase.co`
    pub base_url: String,
    /// Anonymous API key, sent as `apikey` and as a bearer token
    pub api_key: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Backend REST client.
///
/// Uses a semaphore to bound concurrent requests.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    rest_url: String,
    semaphore: Arc<Semaphore>,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        if config.base_url.trim().is_empty() {
            return Err(BackendError::NotConfigured("backend URL is empty".to_string()));
        }

        let invalid_key = |_| BackendError::NotConfigured("invalid API key format".to_string());
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.api_key).map_err(invalid_key)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(invalid_key)?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", config.base_url.trim_end_matches('/')),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.rest_url, path)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BackendError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(BackendError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let body = self.execute(self.http.get(self.url(path)).query(query)).await?;
        parse_body(&body)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let request = self
            .http
            .post(self.url(path))
            .header("Prefer", RETURN_ROWS)
            .json(body);
        let body = self.execute(request).await?;
        parse_body(&body)
    }

    /// POST without reading the response body.
    async fn post_minimal<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, String)],
        prefer: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        let request = self
            .http
            .post(self.url(path))
            .query(query)
            .header("Prefer", prefer)
            .json(body);
        self.execute(request).await.map(|_| ())
    }

    /// Insert one row and return its id.
    async fn insert_one<B: Serialize>(&self, table: &str, row: &B) -> Result<RowId, BackendError> {
        let inserted: Vec<InsertedRow> = self.post_json(table, row).await?;
        inserted
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| BackendError::Json {
                message: format!("insert into {table} returned no rows"),
                body: None,
            })
    }

    /// Write the stops and contacts of a freshly inserted trip.
    async fn insert_route(&self, trip: &ValidatedTrip, trip_id: &RowId) -> Result<(), BackendError> {
        self.post_minimal("trip_stops", &[], RETURN_NOTHING, &stop_inserts(trip, trip_id))
            .await?;

        let contacts = contact_inserts(trip, trip_id);
        if !contacts.is_empty() {
            self.post_minimal("trip_contacts", &[], RETURN_NOTHING, &contacts)
                .await?;
        }
        Ok(())
    }

    async fn get_trips(&self, query: Vec<(&str, String)>) -> Result<Vec<Trip>, BackendError> {
        let rows: Vec<TripRow> = self.get_json("trips", &query).await?;
        let count = rows.len();
        let trips = trips_from_rows(rows);
        tracing::debug!(rows = count, trips = trips.len(), "fetched trips");
        Ok(trips)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}

/// Strip characters with meaning in the REST filter grammar.
fn filter_term(query: &str) -> String {
    query
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '{' | '}' | '*' | '%' | '"' | '\\'))
        .collect()
}

/// `or=(...)` filter matching any localized name containing `term`.
fn name_filter(term: &str) -> String {
    format!("(name_en.ilike.*{term}*,name_fr.ilike.*{term}*,name_ar.ilike.*{term}*)")
}

/// Like [`name_filter`], plus cities with an alias exactly equal to `term`.
fn city_filter(term: &str) -> String {
    format!(
        "(name_en.ilike.*{term}*,name_fr.ilike.*{term}*,name_ar.ilike.*{term}*,aliases.cs.{{\"{term}\"}})"
    )
}

fn city_suggest_query(term: &str, limit: usize) -> [(&'static str, String); 3] {
    [
        (
            "select",
            "id,name_en,name_fr,name_ar,country_id,country:countries(name_en,name_fr,name_ar)"
                .to_string(),
        ),
        ("or", city_filter(term)),
        ("limit", limit.to_string()),
    ]
}

fn country_suggest_query(term: &str, limit: usize) -> [(&'static str, String); 3] {
    [
        ("select", COUNTRY_SELECT.to_string()),
        ("or", name_filter(term)),
        ("limit", limit.to_string()),
    ]
}

fn date_filter(date: NaiveDate) -> String {
    format!("gte.{}", date.format("%Y-%m-%d"))
}

impl CatalogSource for BackendClient {
    async fn fetch_countries(&self) -> Result<Vec<Country>, BackendError> {
        let rows: Vec<CountryRow> = self
            .get_json("countries", &[("select", COUNTRY_SELECT.to_string())])
            .await?;
        Ok(rows.into_iter().map(country_from_row).collect())
    }

    async fn fetch_cities(&self) -> Result<Vec<City>, BackendError> {
        let rows: Vec<CityRow> = self
            .get_json("cities", &[("select", CITY_SELECT.to_string())])
            .await?;
        Ok(rows.into_iter().map(city_from_row).collect())
    }

    async fn suggest_locations(
        &self,
        query: &str,
        limits: SuggestLimits,
    ) -> Result<Vec<LocationHit>, BackendError> {
        let term = filter_term(query);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let city_query = city_suggest_query(&term, limits.cities);
        let country_query = country_suggest_query(&term, limits.countries);
        let cities = self.get_json::<Vec<CityHitRow>>("cities", &city_query);
        let countries = self.get_json::<Vec<CountryRow>>("countries", &country_query);
        let (cities, countries) = futures::try_join!(cities, countries)?;

        Ok(cities
            .into_iter()
            .filter_map(city_hit_from_row)
            .chain(countries.into_iter().map(country_hit_from_row))
            .collect())
    }
}

impl TripSource for BackendClient {
    async fn fetch_active_trips(&self, scope: &TripScope) -> Result<Vec<Trip>, BackendError> {
        let mut query = vec![
            ("select", TRIP_SELECT.to_string()),
            ("status", "eq.active".to_string()),
            ("departure_date", date_filter(scope.departing_on_or_after)),
            ("order", "departure_date.asc".to_string()),
        ];
        if let Some(country) = scope.origin_country {
            query.push(("origin_country_id", format!("eq.{country}")));
        }
        if let Some(country) = scope.destination_country {
            query.push(("destination_country_id", format!("eq.{country}")));
        }
        self.get_trips(query).await
    }

    async fn fetch_trips(&self, ids: &[TripId]) -> Result<Vec<Trip>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let list = ids
            .iter()
            .map(|id| format!("\"{}\"", id.as_str()))
            .collect::<Vec<_>>()
            .join(",");
        self.get_trips(vec![
            ("select", TRIP_SELECT.to_string()),
            ("id", format!("in.({list})")),
        ])
        .await
    }

    async fn classify_trips(
        &self,
        request: &ClassifyRequest,
    ) -> Result<Vec<MatchClassification>, BackendError> {
        let rows: Vec<MatchRow> = self
            .post_json("rpc/search_trips_with_match_type", request)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| MatchClassification {
                id: TripId::new(row.id.into_string()),
                match_type: row.match_type,
            })
            .collect())
    }
}

impl TripStore for BackendClient {
    async fn create_trip(&self, trip: &ValidatedTrip) -> Result<TripId, BackendError> {
        let carrier_id = self
            .insert_one("carriers", &carrier_insert(trip, new_username(&trip.full_name)))
            .await?;

        let row = trip_insert(trip, carrier_id, new_url_id())
            .ok_or_else(|| BackendError::Api {
                status: 0,
                message: "trip has fewer than two stops".to_string(),
            })?;
        let trip_id = self.insert_one("trips", &row).await?;

        if let Err(e) = self.insert_route(trip, &trip_id).await {
            let trip_id = trip_id.into_string();
            tracing::warn!(%trip_id, error = %e, "trip row left without its route");
            return Err(BackendError::IncompleteTrip {
                trip_id,
                source: Box::new(e),
            });
        }

        Ok(TripId::new(trip_id.into_string()))
    }

    async fn log_search(&self, event: &SearchEvent) -> Result<(), BackendError> {
        let row = SearchLogInsert {
            origin_query: event.origin_query.clone(),
            destination_query: event.destination_query.clone(),
            results_count: event.results_count,
            user_agent: event.user_agent.clone(),
            device_type: event.device_type.as_str(),
        };
        self.post_minimal("search_logs", &[], RETURN_NOTHING, &row)
            .await
    }

    async fn log_trip_view(&self, event: &TripViewEvent) -> Result<(), BackendError> {
        let row = TripViewInsert {
            trip_id: event.trip_id.as_str().to_string(),
            user_agent: event.user_agent.clone(),
            device_type: event.device_type.as_str(),
        };
        self.post_minimal("trip_analytics", &[], RETURN_NOTHING, &row)
            .await
    }

    async fn log_contact_click(
        &self,
        trip: &TripId,
        kind: ContactKind,
    ) -> Result<(), BackendError> {
        let mut row = ContactClickUpsert {
            trip_id: trip.as_str().to_string(),
            ..Default::default()
        };
        match kind {
            ContactKind::Phone => row.clicked_phone = Some(true),
            ContactKind::Whatsapp => row.clicked_whatsapp = Some(true),
            ContactKind::Messenger => row.clicked_messenger = Some(true),
        }
        self.post_minimal(
            "trip_analytics",
            &[("on_conflict", "trip_id".to_string())],
            UPSERT,
            &row,
        )
        .await
    }
}
