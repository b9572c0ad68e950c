//! Result ordering.
//!
//! Country matches are ordered by how closely they follow the search:
//! 1. Score (higher is better)
//! 2. Departure date (earlier is better)
//! 3. Trip id, so the order never depends on input order

use std::cmp::Reverse;

use crate::domain::Trip;

use super::matcher::SearchLocation;

const CITY_ON_ROUTE: u32 = 10;
const SAME_DIRECTION: u32 = 5;

/// Relevance of a country match.
///
/// +10 for each searched city that appears anywhere in the route, +5 when
/// the trip runs from the origin country to the destination country.
pub fn score_country_match(trip: &Trip, origin: &SearchLocation, destination: &SearchLocation) -> u32 {
    let mut score = 0;
    if origin.named_city().is_some_and(|c| trip.visits_city(c)) {
        score += CITY_ON_ROUTE;
    }
    if destination.named_city().is_some_and(|c| trip.visits_city(c)) {
        score += CITY_ON_ROUTE;
    }
    if trip.origin().place.country == origin.country()
        && trip.destination().place.country == destination.country()
    {
        score += SAME_DIRECTION;
    }
    score
}

/// Sort country matches best-first.
pub fn rank_country_matches(
    mut trips: Vec<Trip>,
    origin: &SearchLocation,
    destination: &SearchLocation,
) -> Vec<Trip> {
    trips.sort_by_cached_key(|t| {
        (
            Reverse(score_country_match(t, origin, destination)),
            t.departure_date,
            t.id.clone(),
        )
    });
    trips
}

/// Sort by departure date, earliest first. Stable for equal dates.
pub fn sort_by_departure(trips: &mut [Trip]) {
    trips.sort_by_key(|t| t.departure_date);
}
