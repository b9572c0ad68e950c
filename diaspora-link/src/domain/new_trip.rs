//! Validation of trips submitted by carriers.
//!
//! A [`NewTrip`] is raw form input. [`NewTrip::validate`] checks it and
//! produces a [`ValidatedTrip`], which is the only thing the backend will
//! persist. Every issue is collected so the caller can report them together.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::date::is_today_or_future;
use super::error::DomainError;
use super::trip::first_duplicate_city;
use super::{
    Carrier, CityId, Contact, ContactKind, CountryId, Currency, PhoneNumber, Place, Price,
    RouteStop, StopDetails, StopRole, Trip, TripId,
};

/// Price used when the carrier does not give one.
pub const DEFAULT_PRICE_PER_KG: f64 = 15.0;

/// A stop as entered on the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStop {
    pub city: Option<CityId>,
    #[serde(default)]
    pub role: StopRole,
    #[serde(default)]
    pub details: StopDetails,
}

/// A trip as submitted by a carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrip {
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub whatsapp: bool,
    #[serde(default)]
    pub messenger: Option<String>,
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    /// Origin first, destination last.
    pub stops: Vec<NewStop>,
    #[serde(default)]
    pub price_per_kg: Option<f64>,
    #[serde(default)]
    pub currency: Currency,
}

/// A single problem with a submitted trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "field", content = "detail", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("full name is required")]
    FullNameRequired,

    #[error("phone number is required")]
    PhoneRequired,

    #[error("{0}")]
    InvalidPhone(String),

    #[error("departure date is required")]
    DepartureDateRequired,

    #[error("departure date must not be in the past")]
    DepartureInPast,

    #[error("origin city is required")]
    OriginRequired,

    #[error("destination city is required")]
    DestinationRequired,

    #[error("city is required for stop {0}")]
    StopCityRequired(usize),

    #[error("unknown city {0}")]
    UnknownCity(CityId),

    #[error("duplicate cities are not allowed (city {0})")]
    DuplicateCity(CityId),

    #[error("price per kg must be positive")]
    InvalidPrice,
}

/// All problems found in a submitted trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("trip is invalid: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn contains(&self, issue: &ValidationIssue) -> bool {
        self.0.contains(issue)
    }
}

/// A trip that passed validation and is ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTrip {
    pub full_name: String,
    pub phone: PhoneNumber,
    pub departure_date: NaiveDate,
    pub notes: String,
    pub stops: Vec<RouteStop>,
    pub contacts: Vec<Contact>,
    pub price: Price,
}

impl NewTrip {
    /// Validate the submission.
    ///
    /// `country_of` looks up the owning country of a city; cities it does
    /// not know are reported as [`ValidationIssue::UnknownCity`].
    pub fn validate(
        &self,
        today: NaiveDate,
        country_of: impl Fn(CityId) -> Option<CountryId>,
    ) -> Result<ValidatedTrip, ValidationErrors> {
        let mut issues = Vec::new();

        if self.full_name.trim().is_empty() {
            issues.push(ValidationIssue::FullNameRequired);
        }

        let phone = if self.phone.trim().is_empty() {
            issues.push(ValidationIssue::PhoneRequired);
            None
        } else {
            match PhoneNumber::parse(&self.phone) {
                Ok(p) => Some(p),
                Err(e) => {
                    issues.push(ValidationIssue::InvalidPhone(e.to_string()));
                    None
                }
            }
        };

        match self.departure_date {
            None => issues.push(ValidationIssue::DepartureDateRequired),
            Some(date) if !is_today_or_future(date, today) => issues.push(ValidationIssue::DepartureInPast),
            Some(_) => {}
        }

        let price_per_kg = self.price_per_kg.unwrap_or(DEFAULT_PRICE_PER_KG);
        if !(price_per_kg.is_finite() && price_per_kg > 0.0) {
            issues.push(ValidationIssue::InvalidPrice);
        }

        let stops = self.validate_stops(&country_of, &mut issues);

        if !issues.is_empty() {
            return Err(ValidationErrors(issues));
        }

        // Every branch above that leaves these empty also records an issue
        let (Some(phone), Some(departure_date), Some(stops)) = (phone, self.departure_date, stops)
        else {
            return Err(ValidationErrors(issues));
        };

        Ok(ValidatedTrip {
            full_name: self.full_name.trim().to_string(),
            contacts: self.contacts(&phone),
            phone,
            departure_date,
            notes: self.notes.trim().to_string(),
            stops,
            price: Price::new(price_per_kg, self.currency),
        })
    }

    fn validate_stops(
        &self,
        country_of: &impl Fn(CityId) -> Option<CountryId>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<Vec<RouteStop>> {
        let count = self.stops.len();
        let before = issues.len();

        if self.stops.first().and_then(|s| s.city).is_none() {
            issues.push(ValidationIssue::OriginRequired);
        }
        if count < 2 || self.stops.last().and_then(|s| s.city).is_none() {
            issues.push(ValidationIssue::DestinationRequired);
        }
        for (idx, stop) in self.stops.iter().enumerate().take(count.saturating_sub(1)).skip(1) {
            if stop.city.is_none() {
                issues.push(ValidationIssue::StopCityRequired(idx));
            }
        }

        if let Some(city) = first_duplicate_city(self.stops.iter().filter_map(|s| s.city)) {
            issues.push(ValidationIssue::DuplicateCity(city));
        }

        let mut stops = Vec::with_capacity(count);
        for (idx, stop) in self.stops.iter().enumerate() {
            let Some(city) = stop.city else { continue };
            let Some(country) = country_of(city) else {
                issues.push(ValidationIssue::UnknownCity(city));
                continue;
            };

            let role = if idx == 0 {
                StopRole::Pickup
            } else if idx == count - 1 {
                StopRole::Dropoff
            } else {
                stop.role
            };

            stops.push(
                RouteStop::new(Place::new(city, country), role, idx as u32)
                    .with_details(stop.details.clone()),
            );
        }

        (issues.len() == before).then_some(stops)
    }

    /// Phone always; WhatsApp on the same number when enabled; Messenger when given.
    fn contacts(&self, phone: &PhoneNumber) -> Vec<Contact> {
        let mut contacts = vec![Contact::new(ContactKind::Phone, phone.as_str())];
        if self.whatsapp {
            contacts.push(Contact::new(ContactKind::Whatsapp, phone.as_str()));
        }
        if let Some(handle) = self.messenger.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            contacts.push(Contact::new(ContactKind::Messenger, handle));
        }
        contacts
    }
}

impl ValidatedTrip {
    /// Build the stored trip once the backend has assigned identifiers.
    pub fn into_trip(
        self,
        id: TripId,
        username: String,
        url_id: String,
    ) -> Result<Trip, DomainError> {
        let carrier = Carrier {
            full_name: self.full_name,
            username,
        };
        Ok(
            Trip::new(id, carrier, self.stops, self.departure_date, self.price)?
                .with_contacts(self.contacts)
                .with_notes(self.notes)
                .with_url_id(url_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn country_of(city: CityId) -> Option<CountryId> {
        match city.0 {
            1 | 2 => Some(CountryId(100)),
            3 => Some(CountryId(200)),
            _ => None,
        }
    }

    fn stop(city: i64) -> NewStop {
        NewStop {
            city: Some(CityId(city)),
            ..NewStop::default()
        }
    }

    fn valid() -> NewTrip {
        NewTrip {
            full_name: "Karim Benali".to_string(),
            phone: "+33 6 12 34 56 78".to_string(),
            whatsapp: true,
            messenger: Some("karim.b".to_string()),
            departure_date: Some(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()),
            notes: "  Small parcels only ".to_string(),
            stops: vec![stop(1), stop(2), stop(3)],
            price_per_kg: None,
            currency: Currency::Eur,
        }
    }

    #[test]
    fn valid_trip_passes() {
        let validated = valid().validate(today(), country_of).unwrap();

        assert_eq!(validated.full_name, "Karim Benali");
        assert_eq!(validated.phone.as_str(), "+33612345678");
        assert_eq!(validated.notes, "Small parcels only");
        assert_eq!(validated.price, Price::new(DEFAULT_PRICE_PER_KG, Currency::Eur));

        assert_eq!(validated.stops.len(), 3);
        assert_eq!(validated.stops[0].role, StopRole::Pickup);
        assert_eq!(validated.stops[1].role, StopRole::Both);
        assert_eq!(validated.stops[2].role, StopRole::Dropoff);
        assert_eq!(validated.stops[2].place.country, CountryId(200));
        assert_eq!(validated.stops[2].sequence, 2);

        let kinds: Vec<_> = validated.contacts.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ContactKind::Phone, ContactKind::Whatsapp, ContactKind::Messenger]
        );
    }

    #[test]
    fn duplicate_city_rejected_before_persistence() {
        let mut trip = valid();
        trip.stops = vec![stop(1), stop(3), stop(1)];

        let errors = trip.validate(today(), country_of).unwrap_err();
        assert!(errors.contains(&ValidationIssue::DuplicateCity(CityId(1))));
    }

    #[test]
    fn collects_every_issue() {
        let trip = NewTrip {
            full_name: "  ".to_string(),
            phone: "0612".to_string(),
            whatsapp: false,
            messenger: None,
            departure_date: Some(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            notes: String::new(),
            stops: vec![NewStop::default(), stop(9), NewStop::default()],
            price_per_kg: Some(-2.0),
            currency: Currency::Eur,
        };

        let errors = trip.validate(today(), country_of).unwrap_err();
        assert!(errors.contains(&ValidationIssue::FullNameRequired));
        assert!(errors.contains(&ValidationIssue::DepartureInPast));
        assert!(errors.contains(&ValidationIssue::OriginRequired));
        assert!(errors.contains(&ValidationIssue::DestinationRequired));
        assert!(errors.contains(&ValidationIssue::UnknownCity(CityId(9))));
        assert!(errors.contains(&ValidationIssue::InvalidPrice));
        assert!(
            errors
                .issues()
                .iter()
                .any(|i| matches!(i, ValidationIssue::InvalidPhone(_)))
        );
    }

    #[test]
    fn missing_intermediate_city() {
        let mut trip = valid();
        trip.stops = vec![stop(1), NewStop::default(), stop(3)];

        let errors = trip.validate(today(), country_of).unwrap_err();
        assert_eq!(errors.issues(), &[ValidationIssue::StopCityRequired(1)]);
    }

    #[test]
    fn single_stop_needs_destination() {
        let mut trip = valid();
        trip.stops = vec![stop(1)];

        let errors = trip.validate(today(), country_of).unwrap_err();
        assert!(errors.contains(&ValidationIssue::DestinationRequired));
    }

    #[test]
    fn missing_date_and_phone() {
        let mut trip = valid();
        trip.departure_date = None;
        trip.phone = String::new();

        let errors = trip.validate(today(), country_of).unwrap_err();
        assert!(errors.contains(&ValidationIssue::DepartureDateRequired));
        assert!(errors.contains(&ValidationIssue::PhoneRequired));
    }

    #[test]
    fn contacts_without_optional_channels() {
        let mut trip = valid();
        trip.whatsapp = false;
        trip.messenger = Some("   ".to_string());

        let validated = trip.validate(today(), country_of).unwrap();
        assert_eq!(validated.contacts.len(), 1);
        assert_eq!(validated.contacts[0].kind, ContactKind::Phone);
    }

    #[test]
    fn into_trip_keeps_route() {
        let validated = valid().validate(today(), country_of).unwrap();
        let trip = validated
            .into_trip(TripId::new("new-1"), "karimbenali7".into(), "abcd1234".into())
            .unwrap();

        assert_eq!(trip.origin().place.city, CityId(1));
        assert_eq!(trip.destination().place.city, CityId(3));
        assert_eq!(trip.url_id.as_deref(), Some("abcd1234"));
        assert_eq!(trip.carrier.username, "karimbenali7");
        assert_eq!(trip.contacts.len(), 3);
    }
}
