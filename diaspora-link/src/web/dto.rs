//! Data transfer objects for web requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{LocationCatalog, LocationSuggestion};
use crate::domain::{
    CityId, Contact, CountryId, Language, RouteStop, StopRole, Trip, UNKNOWN_FLAG,
    ValidationIssue, days_until, format_departure,
};
use crate::search::{NearestCity, NearestPair, SearchCountries, SearchResults};

/// Query string for trip search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub destination: String,

    /// Language code: en, fr or ar (defaults to en)
    pub lang: Option<String>,
}

/// Query string for location autocomplete.
#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    #[serde(default)]
    pub q: String,

    pub lang: Option<String>,
}

/// Query string carrying only a language.
#[derive(Debug, Default, Deserialize)]
pub struct LangParams {
    pub lang: Option<String>,
}

/// Search results, ready to render.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub exact_matches: Vec<TripView>,
    pub country_matches: Vec<TripView>,
    pub search_countries: SearchCountries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest: Option<NearestView>,
    pub total: usize,
}

impl SearchResponse {
    pub fn from_results(
        results: &SearchResults,
        catalog: &LocationCatalog,
        language: Language,
        today: NaiveDate,
    ) -> Self {
        let views = |trips: &[Trip]| {
            trips
                .iter()
                .map(|t| TripView::from_trip(t, catalog, language, today))
                .collect()
        };
        Self {
            exact_matches: views(&results.exact_matches),
            country_matches: views(&results.country_matches),
            search_countries: results.search_countries.clone(),
            nearest: results
                .nearest
                .map(|pair| NearestView::from_pair(pair, catalog, language)),
            total: results.total(),
        }
    }
}

/// The cities shown instead of the searched ones.
#[derive(Debug, Serialize)]
pub struct NearestView {
    pub pickup: NearestCityView,
    pub dropoff: NearestCityView,
}

impl NearestView {
    fn from_pair(pair: NearestPair, catalog: &LocationCatalog, language: Language) -> Self {
        Self {
            pickup: NearestCityView::new(pair.pickup, catalog, language),
            dropoff: NearestCityView::new(pair.dropoff, catalog, language),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearestCityView {
    pub city_id: CityId,
    pub city: String,
    pub country: String,
    pub distance_km: f64,
}

impl NearestCityView {
    fn new(nearest: NearestCity, catalog: &LocationCatalog, language: Language) -> Self {
        Self {
            city_id: nearest.city,
            city: city_name(catalog, nearest.city, language),
            country: country_name(catalog, nearest.country, language),
            distance_km: nearest.distance_km,
        }
    }
}

/// A trip with names, flags and links resolved for display.
#[derive(Debug, Serialize)]
pub struct TripView {
    pub id: String,
    pub url_id: Option<String>,
    pub carrier_name: String,
    pub carrier_username: String,
    pub departure_date: NaiveDate,
    /// Localised, e.g. "15 mars 2026"
    pub departure_display: String,
    /// Negative once the trip has left
    pub days_until_departure: i64,
    pub route: Vec<StopView>,
    /// Flags of the countries on the route, in reading order
    pub flags: Vec<String>,
    pub price_per_kg: f64,
    pub currency: String,
    pub currency_symbol: &'static str,
    pub available_kg: Option<f64>,
    pub notes: String,
    pub contacts: Vec<ContactView>,
}

impl TripView {
    pub fn from_trip(
        trip: &Trip,
        catalog: &LocationCatalog,
        language: Language,
        today: NaiveDate,
    ) -> Self {
        let mut flags: Vec<String> = trip
            .countries()
            .into_iter()
            .map(|c| {
                catalog
                    .country(c)
                    .map(|country| country.flag())
                    .unwrap_or_else(|| UNKNOWN_FLAG.to_string())
            })
            .collect();
        if language.is_rtl() {
            flags.reverse();
        }

        Self {
            id: trip.id.to_string(),
            url_id: trip.url_id.clone(),
            carrier_name: trip.carrier.full_name.clone(),
            carrier_username: trip.carrier.username.clone(),
            departure_date: trip.departure_date,
            departure_display: format_departure(trip.departure_date, language),
            days_until_departure: days_until(trip.departure_date, today),
            route: trip
                .stops()
                .iter()
                .map(|s| StopView::from_stop(s, catalog, language))
                .collect(),
            flags,
            price_per_kg: trip.price.per_kg,
            currency: trip.price.currency.code().to_string(),
            currency_symbol: trip.price.currency.symbol(),
            available_kg: trip.available_kg,
            notes: trip.notes.clone(),
            contacts: trip.contacts.iter().map(ContactView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StopView {
    pub city_id: CityId,
    pub city: String,
    pub country: String,
    pub flag: String,
    pub role: StopRole,
    pub sequence: u32,
    pub address: Option<String>,
    pub availability: Option<String>,
    pub instructions: Option<String>,
}

impl StopView {
    fn from_stop(stop: &RouteStop, catalog: &LocationCatalog, language: Language) -> Self {
        Self {
            city_id: stop.place.city,
            city: city_name(catalog, stop.place.city, language),
            country: country_name(catalog, stop.place.country, language),
            flag: catalog
                .country(stop.place.country)
                .map(|c| c.flag())
                .unwrap_or_else(|| UNKNOWN_FLAG.to_string()),
            role: stop.role,
            sequence: stop.sequence,
            address: stop.details.address.clone(),
            availability: stop.details.availability.clone(),
            instructions: stop.details.instructions.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactView {
    pub kind: String,
    pub label: String,
    pub value: String,
    /// Deep link that opens the contact's app
    pub link: String,
}

impl From<&Contact> for ContactView {
    fn from(contact: &Contact) -> Self {
        Self {
            kind: contact.kind.as_str().to_string(),
            label: contact.label.clone(),
            value: contact.value.clone(),
            link: contact.link(),
        }
    }
}

/// Autocomplete response.
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<LocationSuggestion>,
}

/// Response to a successful trip creation.
#[derive(Debug, Serialize)]
pub struct CreateTripResponse {
    pub id: String,
}

/// Response to a contact click.
#[derive(Debug, Serialize)]
pub struct ContactLinkResponse {
    pub link: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Per-field problems, for rejected trip submissions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

fn city_name(catalog: &LocationCatalog, id: CityId, language: Language) -> String {
    catalog
        .city(id)
        .map(|c| c.name.resolve(language).to_string())
        .unwrap_or_else(|| format!("#{id}"))
}

fn country_name(catalog: &LocationCatalog, id: CountryId, language: Language) -> String {
    catalog
        .country(id)
        .map(|c| c.name.resolve(language).to_string())
        .unwrap_or_else(|| format!("#{id}"))
}
