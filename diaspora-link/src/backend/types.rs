//! Backend row DTOs.
//!
//! These map directly onto the backend's REST representation. Numeric
//! columns may arrive as JSON numbers or as strings, and most columns are
//! nullable, so fields are lenient and validated during conversion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CityId, CountryId, Currency};

use super::source::MatchType;

/// A numeric column that may be serialized as a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// The value, if it is a finite number.
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// A primary key: integer or text (UUID) depending on the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl RowId {
    pub fn into_string(self) -> String {
        match self {
            RowId::Int(n) => n.to_string(),
            RowId::Text(s) => s,
        }
    }
}

/// Row from the `countries` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRow {
    pub id: i64,
    pub name_en: String,
    #[serde(default)]
    pub name_fr: Option<String>,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub iso_code: Option<String>,
    #[serde(default)]
    pub flag_emoji: Option<String>,
}

/// Row from the `cities` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRow {
    pub id: i64,
    pub name_en: String,
    #[serde(default)]
    pub name_fr: Option<String>,
    #[serde(default)]
    pub name_ar: Option<String>,
    pub country_id: i64,
    #[serde(default)]
    pub latitude: Option<Numeric>,
    #[serde(default)]
    pub longitude: Option<Numeric>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
}

/// Country names embedded in a city lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedCountry {
    pub name_en: String,
    #[serde(default)]
    pub name_fr: Option<String>,
    #[serde(default)]
    pub name_ar: Option<String>,
}

/// City row returned by the suggestion query, with its country embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct CityHitRow {
    pub id: i64,
    pub name_en: String,
    #[serde(default)]
    pub name_fr: Option<String>,
    #[serde(default)]
    pub name_ar: Option<String>,
    pub country_id: i64,
    #[serde(default)]
    pub country: Option<EmbeddedCountry>,
}

/// Carrier embedded in a trip row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierRow {
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Row from the `trip_stops` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRow {
    pub stop_order: i64,
    #[serde(default)]
    pub stop_type: Option<String>,
    #[serde(default)]
    pub city_id: Option<i64>,
    #[serde(default)]
    pub country_id: Option<i64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub availability_time: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Row from the `trip_contacts` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRow {
    pub contact_type: String,
    pub contact_value: String,
    #[serde(default)]
    pub contact_label: Option<String>,
}

/// Row from the `trips` table with stops, contacts and carrier embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRow {
    pub id: RowId,
    #[serde(default)]
    pub url_id: Option<String>,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub price_per_kg: Option<Numeric>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub available_kg: Option<Numeric>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub origin_city_id: Option<i64>,
    #[serde(default)]
    pub origin_country_id: Option<i64>,
    #[serde(default)]
    pub destination_city_id: Option<i64>,
    #[serde(default)]
    pub destination_country_id: Option<i64>,
    #[serde(default)]
    pub carrier: Option<CarrierRow>,
    #[serde(default)]
    pub trip_stops: Vec<StopRow>,
    #[serde(default)]
    pub trip_contacts: Vec<ContactRow>,
}

impl TripRow {
    pub fn is_active(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "active")
    }
}

/// Row returned by the match classification procedure.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRow {
    pub id: RowId,
    pub match_type: MatchType,
}

/// Returned by inserts with `Prefer: return=representation`.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertedRow {
    pub id: RowId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarrierInsert {
    pub full_name: String,
    pub username: String,
    pub phone: String,
    pub verified: bool,
    pub total_trips: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripInsert {
    pub url_id: String,
    pub traveler_id: RowId,
    pub origin_city_id: CityId,
    pub origin_country_id: CountryId,
    pub destination_city_id: CityId,
    pub destination_country_id: CountryId,
    pub departure_date: NaiveDate,
    pub price_per_kg: f64,
    pub currency: Currency,
    pub notes: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopInsert {
    pub trip_id: RowId,
    pub city_id: CityId,
    pub country_id: CountryId,
    pub stop_order: u32,
    pub stop_type: &'static str,
    pub address: Option<String>,
    pub availability_time: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInsert {
    pub trip_id: RowId,
    pub contact_type: &'static str,
    pub contact_value: String,
    pub contact_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchLogInsert {
    pub origin_query: String,
    pub destination_query: String,
    pub results_count: usize,
    pub user_agent: Option<String>,
    pub device_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripViewInsert {
    pub trip_id: String,
    pub user_agent: Option<String>,
    pub device_type: &'static str,
}

/// Upsert marking one contact channel as clicked.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactClickUpsert {
    pub trip_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicked_phone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicked_whatsapp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicked_messenger: Option<bool>,
}
