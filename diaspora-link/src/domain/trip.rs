//! Trips and their routes.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::{CityId, Contact, CountryId, Price, TripId};

/// Which legs a stop can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopRole {
    Pickup,
    Dropoff,
    #[default]
    Both,
}

impl StopRole {
    pub fn allows_pickup(self) -> bool {
        matches!(self, StopRole::Pickup | StopRole::Both)
    }

    pub fn allows_dropoff(self) -> bool {
        matches!(self, StopRole::Dropoff | StopRole::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StopRole::Pickup => "pickup",
            StopRole::Dropoff => "dropoff",
            StopRole::Both => "both",
        }
    }

    /// Parse a backend role string. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pickup" => Some(StopRole::Pickup),
            "dropoff" => Some(StopRole::Dropoff),
            "both" => Some(StopRole::Both),
            _ => None,
        }
    }
}

/// A city together with its country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place {
    pub city: CityId,
    pub country: CountryId,
}

impl Place {
    pub fn new(city: CityId, country: CountryId) -> Self {
        Self { city, country }
    }
}

/// Optional free-text details the carrier gives for a stop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopDetails {
    pub address: Option<String>,
    pub availability: Option<String>,
    pub instructions: Option<String>,
}

/// One stop along a trip's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub place: Place,
    pub role: StopRole,
    /// Position in the route; unique within a trip.
    pub sequence: u32,
    #[serde(default)]
    pub details: StopDetails,
}

impl RouteStop {
    pub fn new(place: Place, role: StopRole, sequence: u32) -> Self {
        Self {
            place,
            role,
            sequence,
            details: StopDetails::default(),
        }
    }

    pub fn with_details(mut self, details: StopDetails) -> Self {
        self.details = details;
        self
    }
}

/// The traveler who posted a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub full_name: String,
    pub username: String,
}

/// A posted trip.
///
/// The route always has at least two stops, ordered by sequence: the first
/// is the origin and the last is the destination. Everything in between is
/// an intermediate stop whose role decides which legs it can serve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    /// Short public reference used in shareable links.
    pub url_id: Option<String>,
    pub carrier: Carrier,
    stops: Vec<RouteStop>,
    pub departure_date: NaiveDate,
    pub price: Price,
    /// Remaining capacity, if the carrier gave one.
    pub available_kg: Option<f64>,
    pub contacts: Vec<Contact>,
    pub notes: String,
}

impl Trip {
    /// Create a trip from its route.
    ///
    /// Stops are sorted by sequence. Fails if there are fewer than two stops
    /// or if two stops share a sequence position. Duplicate cities are not
    /// checked here; they are rejected when a trip is created.
    pub fn new(
        id: TripId,
        carrier: Carrier,
        mut stops: Vec<RouteStop>,
        departure_date: NaiveDate,
        price: Price,
    ) -> Result<Self, DomainError> {
        if stops.len() < 2 {
            return Err(DomainError::TooFewStops);
        }

        stops.sort_by_key(|s| s.sequence);
        if let Some(pair) = stops.windows(2).find(|w| w[0].sequence == w[1].sequence) {
            return Err(DomainError::DuplicateSequence(pair[0].sequence));
        }

        Ok(Self {
            id,
            url_id: None,
            carrier,
            stops,
            departure_date,
            price,
            available_kg: None,
            contacts: Vec::new(),
            notes: String::new(),
        })
    }

    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_url_id(mut self, url_id: impl Into<String>) -> Self {
        self.url_id = Some(url_id.into());
        self
    }

    pub fn with_available_kg(mut self, kg: f64) -> Self {
        self.available_kg = Some(kg);
        self
    }

    /// All stops in route order, origin and destination included.
    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    pub fn origin(&self) -> &RouteStop {
        // Non-empty by construction
        &self.stops[0]
    }

    pub fn destination(&self) -> &RouteStop {
        &self.stops[self.stops.len() - 1]
    }

    /// Stops strictly between origin and destination.
    pub fn intermediate_stops(&self) -> &[RouteStop] {
        &self.stops[1..self.stops.len() - 1]
    }

    /// Distinct countries the route touches, in route order.
    pub fn countries(&self) -> Vec<CountryId> {
        let mut seen = HashSet::new();
        self.stops
            .iter()
            .map(|s| s.place.country)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn touches_country(&self, country: CountryId) -> bool {
        self.stops.iter().any(|s| s.place.country == country)
    }

    /// Whether the city is the origin, the destination or any stop.
    pub fn visits_city(&self, city: CityId) -> bool {
        self.stops.iter().any(|s| s.place.city == city)
    }

    /// The first city that appears more than once in the route, if any.
    pub fn duplicate_city(&self) -> Option<CityId> {
        first_duplicate_city(self.stops.iter().map(|s| s.place.city))
    }
}

/// The first city yielded twice by `cities`.
pub(crate) fn first_duplicate_city(cities: impl IntoIterator<Item = CityId>) -> Option<CityId> {
    let mut seen = HashSet::new();
    cities.into_iter().find(|c| !seen.insert(*c))
}
