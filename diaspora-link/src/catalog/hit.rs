//! Location lookup hits and their localized form.

use serde::Serialize;

use crate::domain::{CityId, CountryId, Language, LocalizedText};

/// Upper bounds on the number of suggestions of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestLimits {
    pub cities: usize,
    pub countries: usize,
}

impl Default for SuggestLimits {
    fn default() -> Self {
        Self {
            cities: 10,
            countries: 5,
        }
    }
}

/// A city or country found by a substring lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationHit {
    City {
        id: CityId,
        name: LocalizedText,
        country: CountryId,
        country_name: LocalizedText,
    },
    Country {
        id: CountryId,
        name: LocalizedText,
    },
}

impl LocationHit {
    /// The country this hit belongs to, or is.
    pub fn country_id(&self) -> CountryId {
        match self {
            LocationHit::City { country, .. } => *country,
            LocationHit::Country { id, .. } => *id,
        }
    }

    pub fn city_id(&self) -> Option<CityId> {
        match self {
            LocationHit::City { id, .. } => Some(*id),
            LocationHit::Country { .. } => None,
        }
    }

    /// Display name of the hit's country in `language`.
    pub fn country_name(&self, language: Language) -> &str {
        match self {
            LocationHit::City { country_name, .. } => country_name.resolve(language),
            LocationHit::Country { name, .. } => name.resolve(language),
        }
    }

    pub fn localize(&self, language: Language) -> LocationSuggestion {
        match self {
            LocationHit::City {
                id,
                name,
                country_name,
                ..
            } => {
                let name = name.resolve(language);
                let country = country_name.resolve(language);
                LocationSuggestion {
                    kind: LocationKind::City,
                    id: id.0,
                    name: name.to_string(),
                    country: Some(country.to_string()),
                    display: format!("{name}, {country}"),
                }
            }
            LocationHit::Country { id, name } => {
                let name = name.resolve(language);
                LocationSuggestion {
                    kind: LocationKind::Country,
                    id: id.0,
                    name: name.to_string(),
                    country: None,
                    display: name.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    City,
    Country,
}

/// An autocomplete entry in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSuggestion {
    pub kind: LocationKind,
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// "City, Country" for cities, the country name otherwise.
    pub display: String,
}
