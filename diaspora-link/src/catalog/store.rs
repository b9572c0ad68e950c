//! In-memory city and country catalog.

use std::collections::HashMap;

use crate::domain::{City, CityId, Coordinates, Country, CountryId};

use super::hit::{LocationHit, SuggestLimits};

/// The full set of reference locations, in backend order.
///
/// Immutable once built. Lookups by id go through index maps; name lookups
/// scan in catalog order so that "first match" is well defined.
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    countries: Vec<Country>,
    cities: Vec<City>,
    country_index: HashMap<CountryId, usize>,
    city_index: HashMap<CityId, usize>,
}

impl LocationCatalog {
    pub fn new(countries: Vec<Country>, cities: Vec<City>) -> Self {
        let country_index = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        let city_index = cities.iter().enumerate().map(|(i, c)| (c.id, i)).collect();

        Self {
            countries,
            cities,
            country_index,
            city_index,
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.country_index.get(&id).map(|&i| &self.countries[i])
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.city_index.get(&id).map(|&i| &self.cities[i])
    }

    /// The owning country of a city.
    pub fn country_of(&self, city: CityId) -> Option<CountryId> {
        self.city(city).map(|c| c.country)
    }

    pub fn coordinates(&self, city: CityId) -> Option<Coordinates> {
        self.city(city).and_then(|c| c.coordinates)
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.cities.is_empty()
    }

    /// Substring search over names, cities first.
    ///
    /// Name matching is case-insensitive. A city also matches when the
    /// trimmed query equals one of its aliases exactly, which is what the
    /// remote `aliases.cs` filter does. Cities whose country is missing
    /// from the catalog are left out.
    pub fn suggest(&self, query: &str, limits: SuggestLimits) -> Vec<LocationHit> {
        let term = query.trim();
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let cities = self
            .cities
            .iter()
            .filter(|city| city.name_contains(&needle) || city.has_alias(term))
            .filter_map(|city| {
                let country = self.country(city.country)?;
                Some(LocationHit::City {
                    id: city.id,
                    name: city.name.clone(),
                    country: country.id,
                    country_name: country.name.clone(),
                })
            })
            .take(limits.cities);

        let countries = self
            .countries
            .iter()
            .filter(|country| country.name.contains_lowercase(&needle))
            .map(|country| LocationHit::Country {
                id: country.id,
                name: country.name.clone(),
            })
            .take(limits.countries);

        cities.chain(countries).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocalizedText;

    fn catalog() -> LocationCatalog {
        let countries = vec![
            Country::new(CountryId(1), LocalizedText::new("France", None, None)),
            Country::new(
                CountryId(2),
                LocalizedText::new("Algeria", Some("Algérie".into()), None),
            ),
        ];
        let cities = vec![
            City::new(CityId(10), LocalizedText::english("Paris"), CountryId(1))
                .with_coordinates(48.8566, 2.3522),
            City::new(CityId(20), LocalizedText::english("Oran"), CountryId(2))
                .with_aliases(["Wahran"]),
            City::new(CityId(21), LocalizedText::english("Orleans"), CountryId(1)),
            City::new(CityId(99), LocalizedText::english("Orphan"), CountryId(42)),
        ];
        LocationCatalog::new(countries, cities)
    }

    #[test]
    fn lookups_by_id() {
        let c = catalog();
        assert_eq!(c.country_of(CityId(20)), Some(CountryId(2)));
        assert!(c.coordinates(CityId(10)).is_some());
        assert!(c.coordinates(CityId(20)).is_none());
        assert!(c.city(CityId(5)).is_none());
        assert_eq!(
            c.country(CountryId(2)).map(|c| c.name.resolve(crate::domain::Language::Fr)),
            Some("Algérie")
        );
    }

    #[test]
    fn suggest_cities_before_countries() {
        let hits = catalog().suggest("r", SuggestLimits::default());
        let ids: Vec<_> = hits
            .iter()
            .map(|h| (h.city_id().map(|c| c.0), h.country_id().0))
            .collect();
        // Paris, Oran, Orleans; the orphan city is skipped; then France, Algeria
        assert_eq!(
            ids,
            vec![
                (Some(10), 1),
                (Some(20), 2),
                (Some(21), 1),
                (None, 1),
                (None, 2)
            ]
        );
    }

    #[test]
    fn suggest_respects_limits() {
        let limits = SuggestLimits {
            cities: 1,
            countries: 0,
        };
        let hits = catalog().suggest("or", limits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].city_id(), Some(CityId(20)));
    }

    #[test]
    fn suggest_matches_whole_aliases_and_translations() {
        let hits = catalog().suggest(" Wahran ", SuggestLimits::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].city_id(), Some(CityId(20)));

        // Aliases are not substring-matched, nor case-folded
        assert!(catalog().suggest("Wahr", SuggestLimits::default()).is_empty());
        assert!(catalog().suggest("wahran", SuggestLimits::default()).is_empty());

        let hits = catalog().suggest("algé", SuggestLimits::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].country_id(), CountryId(2));
    }

    #[test]
    fn blank_query_suggests_nothing() {
        assert!(catalog().suggest("   ", SuggestLimits::default()).is_empty());
    }
}
