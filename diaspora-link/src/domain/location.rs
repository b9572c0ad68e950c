//! City and country reference data.

use serde::{Deserialize, Serialize};

use super::{CityId, CountryId, LocalizedText};

/// Flag shown when a country has neither a stored flag nor a usable ISO code.
pub const UNKNOWN_FLAG: &str = "🏳️";

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A country record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: LocalizedText,
    /// ISO 3166-1 alpha-2 code, e.g. "DZ".
    #[serde(default)]
    pub iso_code: Option<String>,
    /// Flag emoji as stored by the backend.
    #[serde(default)]
    pub flag_emoji: Option<String>,
}

impl Country {
    pub fn new(id: CountryId, name: LocalizedText) -> Self {
        Self {
            id,
            name,
            iso_code: None,
            flag_emoji: None,
        }
    }

    pub fn with_iso_code(mut self, code: impl Into<String>) -> Self {
        self.iso_code = Some(code.into());
        self
    }

    /// The flag emoji for this country.
    ///
    /// Prefers the stored emoji, then derives one from the ISO code using
    /// regional indicator symbols, then falls back to [`UNKNOWN_FLAG`].
    pub fn flag(&self) -> String {
        if let Some(flag) = self.flag_emoji.as_deref().filter(|f| !f.trim().is_empty()) {
            return flag.to_string();
        }
        self.iso_code
            .as_deref()
            .and_then(flag_from_iso)
            .unwrap_or_else(|| UNKNOWN_FLAG.to_string())
    }
}

/// Build a flag emoji from a two-letter ISO code.
fn flag_from_iso(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    code.to_ascii_uppercase()
        .bytes()
        .map(|b| char::from_u32(0x1F1E6 + u32::from(b - b'A')))
        .collect()
}

/// A city record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: LocalizedText,
    /// The owning country.
    pub country: CountryId,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Alternate spellings, e.g. "Wahran" for Oran.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl City {
    pub fn new(id: CityId, name: LocalizedText, country: CountryId) -> Self {
        Self {
            id,
            name,
            country,
            coordinates: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lng));
        self
    }

    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Whether any name or alias equals `needle`, ignoring case.
    ///
    /// `needle` must already be lowercased.
    pub fn is_named(&self, needle: &str) -> bool {
        self.name.equals_lowercase(needle) || self.aliases.iter().any(|a| a.to_lowercase() == needle)
    }

    /// Whether any localized name contains `needle`, ignoring case.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.contains_lowercase(needle)
    }

    /// Whether `alias` is one of the city's aliases, exactly as stored.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }
}
