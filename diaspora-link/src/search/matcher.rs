//! Stop matching predicates.

use crate::domain::{CityId, Coordinates, CountryId, Place, RouteStop, Trip};

use super::resolver::ResolvedLocation;

/// One side of a search, as used by the trip filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchLocation {
    City {
        city: CityId,
        country: CountryId,
        coordinates: Option<Coordinates>,
    },
    Country {
        country: CountryId,
    },
}

impl SearchLocation {
    pub fn country(&self) -> CountryId {
        match self {
            SearchLocation::City { country, .. } => *country,
            SearchLocation::Country { country } => *country,
        }
    }

    /// The named city, whether or not it has coordinates.
    pub fn named_city(&self) -> Option<CityId> {
        match self {
            SearchLocation::City { city, .. } => Some(*city),
            SearchLocation::Country { .. } => None,
        }
    }

    /// The exact place to match, for a city with coordinates.
    ///
    /// A city without coordinates is matched at country level.
    pub fn city_place(&self) -> Option<Place> {
        match self {
            SearchLocation::City {
                city,
                country,
                coordinates: Some(_),
            } => Some(Place::new(*city, *country)),
            _ => None,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            SearchLocation::City { coordinates, .. } => *coordinates,
            SearchLocation::Country { .. } => None,
        }
    }

    pub fn is_city_specific(&self) -> bool {
        self.city_place().is_some()
    }
}

impl From<&ResolvedLocation> for SearchLocation {
    fn from(location: &ResolvedLocation) -> Self {
        match location {
            ResolvedLocation::City { city, country } => SearchLocation::City {
                city: city.id,
                country: country.id,
                coordinates: city.coordinates,
            },
            ResolvedLocation::Country(country) => SearchLocation::Country {
                country: country.id,
            },
        }
    }
}

/// Whether `trip` can pick up a parcel at `location`.
///
/// The origin always counts; intermediate stops count when their role
/// allows pickup.
pub fn matches_pickup(trip: &Trip, location: &SearchLocation) -> bool {
    matches_side(trip.origin(), trip.intermediate_stops(), location, |s| {
        s.role.allows_pickup()
    })
}

/// Whether `trip` can drop a parcel off at `location`.
pub fn matches_dropoff(trip: &Trip, location: &SearchLocation) -> bool {
    matches_side(trip.destination(), trip.intermediate_stops(), location, |s| {
        s.role.allows_dropoff()
    })
}

fn matches_side(
    endpoint: &RouteStop,
    stops: &[RouteStop],
    location: &SearchLocation,
    eligible: impl Fn(&RouteStop) -> bool,
) -> bool {
    let hit = |stop: &RouteStop| match location.city_place() {
        Some(place) => stop.place == place,
        None => stop.place.country == location.country(),
    };
    hit(endpoint) || stops.iter().filter(|s| eligible(s)).any(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Carrier, Currency, Price, StopRole, TripId};
    use chrono::NaiveDate;

    fn stop(city: i64, country: i64, role: StopRole, sequence: u32) -> RouteStop {
        RouteStop::new(Place::new(CityId(city), CountryId(country)), role, sequence)
    }

    /// Paris (FR) -> Lyon (FR, dropoff only) -> Algiers (DZ, both) -> Oran (DZ)
    fn trip() -> Trip {
        Trip::new(
            TripId::new("t"),
            Carrier::default(),
            vec![
                stop(1, 100, StopRole::Pickup, 0),
                stop(2, 100, StopRole::Dropoff, 1),
                stop(3, 200, StopRole::Both, 2),
                stop(4, 200, StopRole::Dropoff, 3),
            ],
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            Price::new(15.0, Currency::Eur),
        )
        .unwrap()
    }

    fn city(id: i64, country: i64) -> SearchLocation {
        SearchLocation::City {
            city: CityId(id),
            country: CountryId(country),
            coordinates: Some(Coordinates::new(0.0, 0.0)),
        }
    }

    fn country(id: i64) -> SearchLocation {
        SearchLocation::Country {
            country: CountryId(id),
        }
    }

    #[test]
    fn pickup_at_origin_and_pickup_stops() {
        let t = trip();
        assert!(matches_pickup(&t, &city(1, 100)));
        assert!(matches_pickup(&t, &city(3, 200)));
        // Lyon is dropoff-only
        assert!(!matches_pickup(&t, &city(2, 100)));
        // Destination never picks up
        assert!(!matches_pickup(&t, &city(4, 200)));
    }

    #[test]
    fn dropoff_at_destination_and_dropoff_stops() {
        let t = trip();
        assert!(matches_dropoff(&t, &city(4, 200)));
        assert!(matches_dropoff(&t, &city(2, 100)));
        assert!(matches_dropoff(&t, &city(3, 200)));
        assert!(!matches_dropoff(&t, &city(1, 100)));
    }

    #[test]
    fn country_searches_match_any_eligible_stop() {
        let t = trip();
        assert!(matches_pickup(&t, &country(100)));
        assert!(matches_pickup(&t, &country(200)));
        assert!(matches_dropoff(&t, &country(100)));
        assert!(!matches_pickup(&t, &country(300)));
    }

    #[test]
    fn city_search_does_not_fall_back_to_country() {
        let t = trip();
        // Marseille is in France but not on the route
        assert!(!matches_pickup(&t, &city(9, 100)));
    }

    #[test]
    fn city_without_coordinates_matches_by_country() {
        let t = trip();
        let marseille = SearchLocation::City {
            city: CityId(9),
            country: CountryId(100),
            coordinates: None,
        };
        assert!(!marseille.is_city_specific());
        assert!(matches_pickup(&t, &marseille));
        assert_eq!(marseille.named_city(), Some(CityId(9)));
    }
}
