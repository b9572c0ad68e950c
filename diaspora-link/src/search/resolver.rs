//! Free-text location resolution against the catalog.

use crate::catalog::LocationCatalog;
use crate::domain::{City, Country, Language};

use super::config::SearchConfig;

/// A location a search query resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    City { city: City, country: Country },
    Country(Country),
}

impl ResolvedLocation {
    pub fn country(&self) -> &Country {
        match self {
            ResolvedLocation::City { country, .. } => country,
            ResolvedLocation::Country(country) => country,
        }
    }

    pub fn city(&self) -> Option<&City> {
        match self {
            ResolvedLocation::City { city, .. } => Some(city),
            ResolvedLocation::Country(_) => None,
        }
    }

    pub fn country_name(&self, language: Language) -> &str {
        self.country().name.resolve(language)
    }
}

/// Resolves queries by exact, case-insensitive name comparison.
///
/// Resolution order:
/// 1. "City, Country": a city with that name in a country with that name.
/// 2. The first city (catalog order) whose name or alias is the query.
/// 3. The first country whose name is the query.
pub struct LocationResolver<'a> {
    catalog: &'a LocationCatalog,
    config: &'a SearchConfig,
}

impl<'a> LocationResolver<'a> {
    pub fn new(catalog: &'a LocationCatalog, config: &'a SearchConfig) -> Self {
        Self { catalog, config }
    }

    pub fn resolve(&self, query: &str) -> Option<ResolvedLocation> {
        if !self.config.accepts_query(query) {
            return None;
        }
        let needle = query.trim().to_lowercase();

        if let Some((city_part, country_part)) = needle.split_once(',') {
            let (city_part, country_part) = (city_part.trim(), country_part.trim());
            let found = self.known_cities().find(|(city, country)| {
                city.is_named(city_part) && country.name.equals_lowercase(country_part)
            });
            if let Some((city, country)) = found {
                return Some(ResolvedLocation::City {
                    city: city.clone(),
                    country: country.clone(),
                });
            }
            tracing::debug!(query, "no city, country match");
        }

        if let Some((city, country)) = self.known_cities().find(|(city, _)| city.is_named(&needle))
        {
            return Some(ResolvedLocation::City {
                city: city.clone(),
                country: country.clone(),
            });
        }

        self.catalog
            .countries()
            .iter()
            .find(|country| country.name.equals_lowercase(&needle))
            .map(|country| ResolvedLocation::Country(country.clone()))
    }

    /// Cities paired with their country, skipping cities whose country is
    /// missing from the catalog.
    fn known_cities(&self) -> impl Iterator<Item = (&'a City, &'a Country)> + '_ {
        self.catalog.cities().iter().filter_map(move |city| {
            let country = self.catalog.country(city.country);
            if country.is_none() {
                tracing::warn!(city_id = %city.id, "city has no country in catalog, skipping");
            }
            country.map(|country| (city, country))
        })
    }
}
