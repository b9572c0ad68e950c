//! Client-side trip filtering.
//!
//! Splits candidate trips into exact matches and country matches. When no
//! trip matches exactly and both sides name cities with coordinates, the
//! closest served cities stand in for the searched ones.

use serde::Serialize;

use crate::catalog::LocationCatalog;
use crate::domain::{CityId, CountryId, RouteStop, Trip};
use crate::geo;

use super::matcher::{SearchLocation, matches_dropoff, matches_pickup};

/// A served city standing in for a searched one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearestCity {
    pub city: CityId,
    pub country: CountryId,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearestPair {
    pub pickup: NearestCity,
    pub dropoff: NearestCity,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Exact matches, or nearest-city matches when `nearest` is set.
    pub exact: Vec<Trip>,
    pub nearest: Option<NearestPair>,
    pub country: Vec<Trip>,
}

/// Trips serving both given sides. An absent side matches anything; with
/// neither side nothing matches.
pub fn exact_matches(
    trips: &[Trip],
    origin: Option<&SearchLocation>,
    destination: Option<&SearchLocation>,
) -> Vec<Trip> {
    if origin.is_none() && destination.is_none() {
        return Vec::new();
    }
    trips
        .iter()
        .filter(|t| origin.is_none_or(|o| matches_pickup(t, o)))
        .filter(|t| destination.is_none_or(|d| matches_dropoff(t, d)))
        .cloned()
        .collect()
}

/// The closest served cities to two city-specific search locations.
///
/// Pickup candidates are trip origins and pickup stops in the origin's
/// country; dropoff candidates are destinations and dropoff stops in the
/// destination's country. Candidates without coordinates are ignored. On a
/// tie the first candidate found wins.
pub fn nearest_matches(
    trips: &[Trip],
    origin: &SearchLocation,
    destination: &SearchLocation,
    catalog: &LocationCatalog,
) -> Option<NearestPair> {
    let pickup = closest(
        trips.iter().flat_map(|t| {
            std::iter::once(t.origin())
                .chain(t.intermediate_stops().iter().filter(|s| s.role.allows_pickup()))
        }),
        origin,
        catalog,
    )?;
    let dropoff = closest(
        trips.iter().flat_map(|t| {
            std::iter::once(t.destination())
                .chain(t.intermediate_stops().iter().filter(|s| s.role.allows_dropoff()))
        }),
        destination,
        catalog,
    )?;
    Some(NearestPair { pickup, dropoff })
}

fn closest<'a>(
    stops: impl Iterator<Item = &'a RouteStop>,
    target: &SearchLocation,
    catalog: &LocationCatalog,
) -> Option<NearestCity> {
    let from = target.coordinates()?;
    let mut best: Option<NearestCity> = None;
    for stop in stops.filter(|s| s.place.country == target.country()) {
        let Some(to) = catalog.coordinates(stop.place.city) else {
            continue;
        };
        let distance_km = geo::distance_km(from, to);
        if best.is_none_or(|b| distance_km < b.distance_km) {
            best = Some(NearestCity {
                city: stop.place.city,
                country: stop.place.country,
                distance_km,
            });
        }
    }
    best
}

/// Trips touching both countries, in either order, that are not in `exact`.
pub fn country_matches(
    trips: &[Trip],
    origin: CountryId,
    destination: CountryId,
    exact: &[Trip],
) -> Vec<Trip> {
    trips
        .iter()
        .filter(|t| !exact.iter().any(|e| e.id == t.id))
        .filter(|t| t.touches_country(origin) && t.touches_country(destination))
        .cloned()
        .collect()
}

/// Run the full filter over candidate trips.
pub fn filter_trips(
    trips: &[Trip],
    origin: Option<&SearchLocation>,
    destination: Option<&SearchLocation>,
    catalog: &LocationCatalog,
) -> FilterOutcome {
    let mut outcome = FilterOutcome {
        exact: exact_matches(trips, origin, destination),
        ..Default::default()
    };

    if outcome.exact.is_empty()
        && let (Some(o), Some(d)) = (origin, destination)
        && o.is_city_specific()
        && d.is_city_specific()
        && let Some(pair) = nearest_matches(trips, o, d, catalog)
    {
        let near_origin = location_for(pair.pickup, catalog);
        let near_destination = location_for(pair.dropoff, catalog);
        outcome.exact = exact_matches(trips, Some(&near_origin), Some(&near_destination));
        tracing::debug!(
            pickup = %pair.pickup.city,
            dropoff = %pair.dropoff.city,
            trips = outcome.exact.len(),
            "using nearest cities"
        );
        outcome.nearest = Some(pair);
    }

    if let (Some(o), Some(d)) = (origin, destination) {
        outcome.country = country_matches(trips, o.country(), d.country(), &outcome.exact);
    }

    outcome
}

fn location_for(nearest: NearestCity, catalog: &LocationCatalog) -> SearchLocation {
    SearchLocation::City {
        city: nearest.city,
        country: nearest.country,
        coordinates: catalog.coordinates(nearest.city),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Carrier, City, Country, Currency, LocalizedText, Place, Price, StopRole,
        TripId,
    };
    use chrono::NaiveDate;

    const FR: i64 = 1;
    const DZ: i64 = 2;
    const PARIS: i64 = 10;
    const LYON: i64 = 11;
    const MARSEILLE: i64 = 12;
    const ALGIERS: i64 = 20;
    const ORAN: i64 = 21;
    const BLIDA: i64 = 22;

    fn catalog() -> LocationCatalog {
        let city = |id, name, country, lat, lng| {
            City::new(CityId(id), LocalizedText::english(name), CountryId(country))
                .with_coordinates(lat, lng)
        };
        LocationCatalog::new(
            vec![
                Country::new(CountryId(FR), LocalizedText::english("France")),
                Country::new(CountryId(DZ), LocalizedText::english("Algeria")),
            ],
            vec![
                city(PARIS, "Paris", FR, 48.8566, 2.3522),
                city(LYON, "Lyon", FR, 45.7640, 4.8357),
                city(MARSEILLE, "Marseille", FR, 43.2965, 5.3698),
                city(ALGIERS, "Algiers", DZ, 36.7538, 3.0588),
                city(ORAN, "Oran", DZ, 35.6971, -0.6308),
                city(BLIDA, "Blida", DZ, 36.4700, 2.8277),
            ],
        )
    }

    fn trip(id: &str, route: &[(i64, i64, StopRole)]) -> Trip {
        let stops = route
            .iter()
            .enumerate()
            .map(|(i, (city, country, role))| {
                RouteStop::new(Place::new(CityId(*city), CountryId(*country)), *role, i as u32)
            })
            .collect();
        Trip::new(
            TripId::new(id),
            Carrier::default(),
            stops,
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            Price::new(15.0, Currency::Eur),
        )
        .unwrap()
    }

    fn at(city: i64, country: i64) -> SearchLocation {
        let catalog = catalog();
        SearchLocation::City {
            city: CityId(city),
            country: CountryId(country),
            coordinates: catalog.coordinates(CityId(city)),
        }
    }

    fn country(id: i64) -> SearchLocation {
        SearchLocation::Country {
            country: CountryId(id),
        }
    }

    fn ids(trips: &[Trip]) -> Vec<&str> {
        trips.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn exact_with_wildcard_side() {
        let trips = vec![
            trip("a", &[(PARIS, FR, StopRole::Pickup), (ORAN, DZ, StopRole::Dropoff)]),
            trip("b", &[(ALGIERS, DZ, StopRole::Pickup), (LYON, FR, StopRole::Dropoff)]),
        ];
        assert_eq!(ids(&exact_matches(&trips, Some(&country(FR)), None)), ["a"]);
        assert_eq!(ids(&exact_matches(&trips, None, Some(&country(FR)))), ["b"]);
        assert!(exact_matches(&trips, None, None).is_empty());
    }

    #[test]
    fn exact_trip_is_not_a_country_match() {
        let trips = vec![
            trip("a", &[(PARIS, FR, StopRole::Pickup), (ORAN, DZ, StopRole::Dropoff)]),
            trip("b", &[(LYON, FR, StopRole::Pickup), (ALGIERS, DZ, StopRole::Dropoff)]),
        ];
        let outcome = filter_trips(
            &trips,
            Some(&at(PARIS, FR)),
            Some(&at(ORAN, DZ)),
            &catalog(),
        );
        assert_eq!(ids(&outcome.exact), ["a"]);
        assert_eq!(ids(&outcome.country), ["b"]);
        assert!(outcome.nearest.is_none());
    }

    #[test]
    fn country_matches_ignore_direction() {
        let trips = vec![trip(
            "back",
            &[(ORAN, DZ, StopRole::Pickup), (PARIS, FR, StopRole::Dropoff)],
        )];
        let outcome = filter_trips(&trips, Some(&country(FR)), Some(&country(DZ)), &catalog());
        assert!(outcome.exact.is_empty());
        assert_eq!(ids(&outcome.country), ["back"]);
    }

    #[test]
    fn nearest_cities_fill_exact_bucket() {
        let trips = vec![
            trip("lyon", &[(LYON, FR, StopRole::Pickup), (BLIDA, DZ, StopRole::Dropoff)]),
            trip(
                "marseille",
                &[(MARSEILLE, FR, StopRole::Pickup), (ORAN, DZ, StopRole::Dropoff)],
            ),
        ];
        // Paris -> Algiers: Lyon is the closest pickup, Blida the closest dropoff
        let outcome = filter_trips(
            &trips,
            Some(&at(PARIS, FR)),
            Some(&at(ALGIERS, DZ)),
            &catalog(),
        );
        let pair = outcome.nearest.unwrap();
        assert_eq!(pair.pickup.city, CityId(LYON));
        assert_eq!(pair.dropoff.city, CityId(BLIDA));
        assert!(pair.pickup.distance_km > 0.0);
        assert_eq!(ids(&outcome.exact), ["lyon"]);
        assert_eq!(ids(&outcome.country), ["marseille"]);
    }

    #[test]
    fn nearest_skipped_for_country_side() {
        let trips = vec![trip(
            "lyon",
            &[(LYON, FR, StopRole::Pickup), (BLIDA, DZ, StopRole::Dropoff)],
        )];
        let outcome = filter_trips(&trips, Some(&at(PARIS, FR)), Some(&country(DZ)), &catalog());
        assert!(outcome.nearest.is_none());
        assert!(outcome.exact.is_empty());
        assert_eq!(ids(&outcome.country), ["lyon"]);
    }

    #[test]
    fn nearest_ignores_dropoff_only_stops_for_pickup() {
        let trips = vec![trip(
            "t",
            &[
                (MARSEILLE, FR, StopRole::Pickup),
                (LYON, FR, StopRole::Dropoff),
                (ORAN, DZ, StopRole::Dropoff),
            ],
        )];
        let pair = nearest_matches(&trips, &at(PARIS, FR), &at(ALGIERS, DZ), &catalog()).unwrap();
        assert_eq!(pair.pickup.city, CityId(MARSEILLE));
    }

    #[test]
    fn nearest_tie_keeps_first_candidate() {
        let trips = vec![
            trip("a", &[(LYON, FR, StopRole::Pickup), (ORAN, DZ, StopRole::Dropoff)]),
            trip("b", &[(LYON, FR, StopRole::Pickup), (BLIDA, DZ, StopRole::Dropoff)]),
        ];
        let pair = nearest_matches(&trips, &at(PARIS, FR), &at(ORAN, DZ), &catalog()).unwrap();
        assert_eq!(pair.pickup.city, CityId(LYON));
        assert_eq!(pair.dropoff.city, CityId(ORAN));
        assert_eq!(pair.dropoff.distance_km, 0.0);
    }

    #[test]
    fn nearest_needs_candidates_in_both_countries() {
        let trips = vec![trip(
            "fr",
            &[(LYON, FR, StopRole::Pickup), (MARSEILLE, FR, StopRole::Dropoff)],
        )];
        assert!(nearest_matches(&trips, &at(PARIS, FR), &at(ORAN, DZ), &catalog()).is_none());
    }
}
