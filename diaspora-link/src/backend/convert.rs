//! Conversion between backend rows and domain types.
//!
//! Reads are lenient: malformed contacts are dropped and a trip whose route
//! cannot be rebuilt is skipped, each with a warning, rather than failing
//! the whole response.

use std::hash::{BuildHasher, Hasher, RandomState};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::catalog::LocationHit;
use crate::domain::{
    Carrier, City, CityId, Contact, ContactKind, Country, CountryId, Currency,
    DEFAULT_PRICE_PER_KG, DomainError, LocalizedText, Place, Price, RouteStop, StopDetails,
    StopRole, Trip, TripId, ValidatedTrip,
};

use super::types::{
    CarrierInsert, CityHitRow, CityRow, ContactInsert, ContactRow, CountryRow, RowId, StopInsert,
    StopRow, TripInsert, TripRow,
};

/// Length of the public trip reference.
const URL_ID_LEN: usize = 8;

/// Error during row to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required column
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Stops do not form a valid route
    #[error("invalid route: {0}")]
    InvalidRoute(#[from] DomainError),
}

pub fn country_from_row(row: CountryRow) -> Country {
    Country {
        id: CountryId(row.id),
        name: LocalizedText::new(row.name_en, row.name_fr, row.name_ar),
        iso_code: row.iso_code,
        flag_emoji: row.flag_emoji,
    }
}

pub fn city_from_row(row: CityRow) -> City {
    let lat = row.latitude.as_ref().and_then(|v| v.value());
    let lng = row.longitude.as_ref().and_then(|v| v.value());

    let city = City::new(
        CityId(row.id),
        LocalizedText::new(row.name_en, row.name_fr, row.name_ar),
        CountryId(row.country_id),
    )
    .with_aliases(row.aliases.unwrap_or_default());

    match (lat, lng) {
        (Some(lat), Some(lng)) => city.with_coordinates(lat, lng),
        _ => city,
    }
}

/// A city suggestion, or `None` if its country did not come back with it.
pub fn city_hit_from_row(row: CityHitRow) -> Option<LocationHit> {
    let Some(country) = row.country else {
        tracing::warn!(city_id = row.id, "city suggestion without country, skipping");
        return None;
    };

    Some(LocationHit::City {
        id: CityId(row.id),
        name: LocalizedText::new(row.name_en, row.name_fr, row.name_ar),
        country: CountryId(row.country_id),
        country_name: LocalizedText::new(country.name_en, country.name_fr, country.name_ar),
    })
}

pub fn country_hit_from_row(row: CountryRow) -> LocationHit {
    LocationHit::Country {
        id: CountryId(row.id),
        name: LocalizedText::new(row.name_en, row.name_fr, row.name_ar),
    }
}

/// Convert trip rows, skipping any that cannot be converted.
pub fn trips_from_rows(rows: Vec<TripRow>) -> Vec<Trip> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match trip_from_row(row) {
                Ok(trip) => Some(trip),
                Err(e) => {
                    tracing::warn!(trip_id = ?id, error = %e, "skipping malformed trip");
                    None
                }
            }
        })
        .collect()
}

/// Convert a trip row with its embedded stops, contacts and carrier.
///
/// Stops are ordered by `stop_order`. When the stop list does not start at
/// the trip's origin city or end at its destination city, the missing
/// endpoint is rebuilt from the trip columns. Sequences are renumbered
/// from zero.
pub fn trip_from_row(row: TripRow) -> Result<Trip, ConversionError> {
    let origin = endpoint(row.origin_city_id, row.origin_country_id, "origin_city_id")?;
    let destination = endpoint(
        row.destination_city_id,
        row.destination_country_id,
        "destination_city_id",
    )?;

    let mut stop_rows = row.trip_stops;
    stop_rows.sort_by_key(|s| s.stop_order);

    let mut stops = stop_rows
        .into_iter()
        .map(stop_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    if stops.first().is_none_or(|s| s.place.city != origin.city) {
        stops.insert(0, RouteStop::new(origin, StopRole::Pickup, 0));
    }
    if stops.last().is_none_or(|s| s.place.city != destination.city) {
        stops.push(RouteStop::new(destination, StopRole::Dropoff, 0));
    }
    for (i, stop) in stops.iter_mut().enumerate() {
        stop.sequence = i as u32;
    }

    let price = Price::new(
        row.price_per_kg
            .as_ref()
            .and_then(|p| p.value())
            .unwrap_or(DEFAULT_PRICE_PER_KG),
        parse_currency(row.currency.as_deref()),
    );

    let carrier = row
        .carrier
        .map(|c| Carrier {
            full_name: c.full_name,
            username: c.username.unwrap_or_default(),
        })
        .unwrap_or_default();

    let mut trip = Trip::new(
        TripId::new(row.id.into_string()),
        carrier,
        stops,
        row.departure_date,
        price,
    )?
    .with_contacts(row.trip_contacts.into_iter().filter_map(contact_from_row).collect())
    .with_notes(row.notes.unwrap_or_default());

    if let Some(url_id) = row.url_id {
        trip = trip.with_url_id(url_id);
    }
    if let Some(kg) = row.available_kg.as_ref().and_then(|v| v.value()) {
        trip = trip.with_available_kg(kg);
    }

    Ok(trip)
}

fn endpoint(
    city: Option<i64>,
    country: Option<i64>,
    field: &'static str,
) -> Result<Place, ConversionError> {
    match (city, country) {
        (Some(city), Some(country)) => Ok(Place::new(CityId(city), CountryId(country))),
        _ => Err(ConversionError::MissingField(field)),
    }
}

fn stop_from_row(row: StopRow) -> Result<RouteStop, ConversionError> {
    let city = row.city_id.ok_or(ConversionError::MissingField("trip_stops.city_id"))?;
    let country = row
        .country_id
        .ok_or(ConversionError::MissingField("trip_stops.country_id"))?;

    let role = match row.stop_type.as_deref().map(StopRole::parse) {
        Some(Some(role)) => role,
        Some(None) => {
            tracing::warn!(stop_type = ?row.stop_type, "unknown stop type, treating as both");
            StopRole::Both
        }
        None => StopRole::Both,
    };

    let details = StopDetails {
        address: row.address,
        availability: row.availability_time,
        instructions: row.instructions,
    };

    // Sequences are renumbered by the caller
    Ok(RouteStop::new(Place::new(CityId(city), CountryId(country)), role, 0).with_details(details))
}

fn contact_from_row(row: ContactRow) -> Option<Contact> {
    let kind: ContactKind = match row.contact_type.parse() {
        Ok(kind) => kind,
        Err(e) => {
            tracing::warn!(error = %e, "skipping contact");
            return None;
        }
    };

    let mut contact = Contact::new(kind, row.contact_value);
    if let Some(label) = row.contact_label.filter(|l| !l.trim().is_empty()) {
        contact.label = label;
    }
    Some(contact)
}

fn parse_currency(code: Option<&str>) -> Currency {
    match code.map(str::parse::<Currency>) {
        Some(Ok(currency)) => currency,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "falling back to default currency");
            Currency::default()
        }
        None => Currency::default(),
    }
}

/// Carrier row for a new trip.
pub fn carrier_insert(trip: &ValidatedTrip, username: String) -> CarrierInsert {
    CarrierInsert {
        full_name: trip.full_name.clone(),
        username,
        phone: trip.phone.as_str().to_string(),
        verified: false,
        total_trips: 0,
    }
}

/// Trip row for a new trip.
///
/// Returns `None` if the trip has fewer than two stops.
pub fn trip_insert(
    trip: &ValidatedTrip,
    traveler_id: RowId,
    url_id: String,
) -> Option<TripInsert> {
    let origin = trip.stops.first()?;
    let destination = trip.stops.last().filter(|_| trip.stops.len() >= 2)?;

    Some(TripInsert {
        url_id,
        traveler_id,
        origin_city_id: origin.place.city,
        origin_country_id: origin.place.country,
        destination_city_id: destination.place.city,
        destination_country_id: destination.place.country,
        departure_date: trip.departure_date,
        price_per_kg: trip.price.per_kg,
        currency: trip.price.currency,
        notes: trip.notes.clone(),
        status: "active",
    })
}

pub fn stop_inserts(trip: &ValidatedTrip, trip_id: &RowId) -> Vec<StopInsert> {
    trip.stops
        .iter()
        .map(|stop| StopInsert {
            trip_id: trip_id.clone(),
            city_id: stop.place.city,
            country_id: stop.place.country,
            stop_order: stop.sequence,
            stop_type: stop.role.as_str(),
            address: stop.details.address.clone(),
            availability_time: stop.details.availability.clone(),
            instructions: stop.details.instructions.clone(),
        })
        .collect()
}

pub fn contact_inserts(trip: &ValidatedTrip, trip_id: &RowId) -> Vec<ContactInsert> {
    trip.contacts
        .iter()
        .map(|contact| ContactInsert {
            trip_id: trip_id.clone(),
            contact_type: contact.kind.as_str(),
            contact_value: contact.value.clone(),
            contact_label: contact.label.clone(),
        })
        .collect()
}

/// A fresh 64-bit value from the process's random hasher seed and the clock.
fn random_u64() -> u64 {
    let mut hasher = RandomState::new().build_hasher();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    hasher.write_u128(nanos);
    hasher.finish()
}

/// Short public reference for a new trip.
pub fn new_url_id() -> String {
    let encoded = URL_SAFE_NO_PAD.encode(random_u64().to_le_bytes());
    encoded.chars().take(URL_ID_LEN).collect()
}

/// Username for a new carrier: the name without whitespace, lowercased,
/// followed by a number below 100.
pub fn new_username(full_name: &str) -> String {
    let base: String = full_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{base}{}", random_u64() % 100)
}
