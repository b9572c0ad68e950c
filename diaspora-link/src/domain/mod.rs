//! Domain types for the parcel trip board.
//!
//! This module contains the core model: reference locations, trips and
//! their routes, contacts, and the validation applied to new trips. Types
//! enforce their invariants at construction time, so code that receives
//! them can trust their validity.

mod contact;
mod currency;
mod date;
mod error;
mod ids;
mod language;
mod location;
mod new_trip;
mod trip;

pub use contact::{Contact, ContactKind, InvalidPhone, PhoneNumber, UnsupportedContactKind};
pub use currency::{Currency, Price, UnsupportedCurrency};
pub use date::{days_until, format_departure, is_today_or_future};
pub use error::DomainError;
pub use ids::{CityId, CountryId, TripId};
pub use language::{Language, LocalizedText, UnsupportedLanguage};
pub use location::{City, Coordinates, Country, UNKNOWN_FLAG};
pub use new_trip::{
    DEFAULT_PRICE_PER_KG, NewStop, NewTrip, ValidatedTrip, ValidationErrors, ValidationIssue,
};
pub use trip::{Carrier, Place, RouteStop, StopDetails, StopRole, Trip};
