//! Unit tests for the search service, run against the in-memory backend.

use chrono::NaiveDate;

use super::*;
use crate::backend::{ClassifyMode, MatchClassification, MatchType, MockBackend};
use crate::catalog::{CatalogCache, LocationKind};
use crate::domain::{
    Carrier, City, CityId, Country, CountryId, Currency, Language, LocalizedText, NewStop,
    NewTrip, Place, Price, RouteStop, StopRole, Trip, TripId, ValidationIssue,
};

const FR: i64 = 1;
const DZ: i64 = 2;
const TN: i64 = 3;
const PARIS: i64 = 10;
const LYON: i64 = 11;
const MARSEILLE: i64 = 12;
const ALGIERS: i64 = 20;
const ORAN: i64 = 21;
const BLIDA: i64 = 22;
const TUNIS: i64 = 30;

fn countries() -> Vec<Country> {
    vec![
        Country::new(
            CountryId(FR),
            LocalizedText::new("France", None, Some("فرنسا".to_string())),
        ),
        Country::new(
            CountryId(DZ),
            LocalizedText::new(
                "Algeria",
                Some("Algérie".to_string()),
                Some("الجزائر".to_string()),
            ),
        ),
        Country::new(CountryId(TN), LocalizedText::english("Tunisia")),
    ]
}

fn cities() -> Vec<City> {
    let city = |id, name, country, lat, lng| {
        City::new(CityId(id), LocalizedText::english(name), CountryId(country))
            .with_coordinates(lat, lng)
    };
    vec![
        city(PARIS, "Paris", FR, 48.8566, 2.3522),
        city(LYON, "Lyon", FR, 45.7640, 4.8357),
        city(MARSEILLE, "Marseille", FR, 43.2965, 5.3698),
        city(ALGIERS, "Algiers", DZ, 36.7538, 3.0588),
        city(ORAN, "Oran", DZ, 35.6971, -0.6308),
        city(BLIDA, "Blida", DZ, 36.4700, 2.8277),
        city(TUNIS, "Tunis", TN, 36.8065, 10.1815),
    ]
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, month, day).unwrap()
}

fn trip(id: &str, departure: NaiveDate, route: &[(i64, i64, StopRole)]) -> Trip {
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
        departure,
        Price::new(15.0, Currency::Eur),
    )
    .unwrap()
}

fn trips() -> Vec<Trip> {
    vec![
        trip(
            "paris-oran",
            date(3, 10),
            &[(PARIS, FR, StopRole::Pickup), (ORAN, DZ, StopRole::Dropoff)],
        ),
        trip(
            "lyon-algiers",
            date(3, 5),
            &[
                (LYON, FR, StopRole::Pickup),
                (MARSEILLE, FR, StopRole::Both),
                (ALGIERS, DZ, StopRole::Dropoff),
            ],
        ),
        trip(
            "oran-paris",
            date(3, 1),
            &[(ORAN, DZ, StopRole::Pickup), (PARIS, FR, StopRole::Dropoff)],
        ),
        trip(
            "algiers-tunis",
            date(3, 20),
            &[
                (ALGIERS, DZ, StopRole::Pickup),
                (MARSEILLE, FR, StopRole::Both),
                (TUNIS, TN, StopRole::Dropoff),
            ],
        ),
    ]
}

fn backend() -> MockBackend {
    MockBackend::new(countries(), cities(), trips())
}

fn service(backend: &MockBackend) -> SearchService<MockBackend> {
    SearchService::new(backend.clone(), CatalogCache::new(), SearchConfig::default())
}

fn ids(trips: &[Trip]) -> Vec<&str> {
    trips.iter().map(|t| t.id.as_str()).collect()
}

#[tokio::test]
async fn empty_search_makes_no_backend_call() {
    let backend = backend();
    let results = service(&backend).search(&SearchQuery::new("", "  ")).await;

    assert!(results.is_empty());
    assert_eq!(results.search_countries, SearchCountries::default());
    assert!(results.nearest.is_none());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn city_country_query_searches_the_city() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("Oran, Algeria", "Paris"))
        .await;

    assert_eq!(ids(&results.exact_matches), ["oran-paris"]);
    assert_eq!(results.search_countries.origin, "Algeria");
    assert_eq!(results.search_countries.destination, "France");
}

#[tokio::test]
async fn country_origin_with_wildcard_destination() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("France", ""))
        .await;

    // Origin in France, or a pickup stop in France; earliest first
    assert_eq!(
        ids(&results.exact_matches),
        ["lyon-algiers", "paris-oran", "algiers-tunis"]
    );
    assert!(results.country_matches.is_empty());
    assert_eq!(results.search_countries.origin, "France");
    assert_eq!(results.search_countries.destination, "");
}

#[tokio::test]
async fn exact_match_is_not_repeated_as_country_match() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("Paris", "Oran"))
        .await;

    assert_eq!(ids(&results.exact_matches), ["paris-oran"]);
    assert_eq!(ids(&results.country_matches), ["lyon-algiers"]);
    assert!(results.nearest.is_none());
}

#[tokio::test]
async fn nearest_cities_used_when_nothing_matches_exactly() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("Marseille", "Blida"))
        .await;

    let nearest = results.nearest.unwrap();
    assert_eq!(nearest.pickup.city, CityId(MARSEILLE));
    assert_eq!(nearest.dropoff.city, CityId(ALGIERS));
    assert_eq!(ids(&results.exact_matches), ["lyon-algiers"]);
    assert_eq!(ids(&results.country_matches), ["paris-oran"]);
}

#[tokio::test]
async fn nearest_skipped_for_country_search() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("France", "Blida"))
        .await;

    assert!(results.nearest.is_none());
    assert!(results.exact_matches.is_empty());
    assert_eq!(ids(&results.country_matches), ["lyon-algiers", "paris-oran"]);
}

#[tokio::test]
async fn unresolved_side_is_a_wildcard() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("Atlantis", "Oran"))
        .await;

    assert_eq!(ids(&results.exact_matches), ["paris-oran"]);
    assert_eq!(results.search_countries.origin, "");
    assert_eq!(results.search_countries.destination, "Algeria");
}

#[tokio::test]
async fn search_countries_are_localised() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("Paris", "Oran").with_language(Language::Ar))
        .await;

    assert_eq!(results.search_countries.origin, "فرنسا");
    assert_eq!(results.search_countries.destination, "الجزائر");
}

#[tokio::test]
async fn past_and_inactive_trips_are_excluded() {
    let mut all = trips();
    all.push(trip(
        "paris-oran-2000",
        NaiveDate::from_ymd_opt(2000, 3, 10).unwrap(),
        &[(PARIS, FR, StopRole::Pickup), (ORAN, DZ, StopRole::Dropoff)],
    ));
    let backend = MockBackend::new(countries(), cities(), all);
    backend.deactivate(&TripId::new("paris-oran"));
    let results = service(&backend)
        .search(&SearchQuery::new("Paris", "Oran"))
        .await;

    for gone in ["paris-oran", "paris-oran-2000"] {
        assert!(!ids(&results.exact_matches).contains(&gone));
        assert!(!ids(&results.country_matches).contains(&gone));
    }
    // The remaining France to Algeria trip still shows up
    assert_eq!(results.total(), 1);
    assert!(
        ids(&results.exact_matches).contains(&"lyon-algiers")
            || ids(&results.country_matches).contains(&"lyon-algiers")
    );
}

#[tokio::test]
async fn corridor_fallback_skips_reverse_and_transit_trips() {
    let backend = backend();
    let results = service(&backend)
        .search(&SearchQuery::new("France", "Algeria"))
        .await;
    let found: Vec<_> = ids(&results.exact_matches)
        .into_iter()
        .chain(ids(&results.country_matches))
        .collect();
    assert!(!found.contains(&"oran-paris"));
    assert!(!found.contains(&"algiers-tunis"));

    let wide = SearchService::new(
        backend.clone(),
        CatalogCache::new(),
        SearchConfig::default().with_fallback_scope(FallbackScope::AllActive),
    );
    let results = wide.search(&SearchQuery::new("France", "Algeria")).await;
    assert!(ids(&results.country_matches).contains(&"oran-paris"));
}

#[tokio::test]
async fn classification_buckets_trips() {
    let backend = backend().with_classification(ClassifyMode::Fixed(vec![
        MatchClassification {
            id: TripId::new("paris-oran"),
            match_type: MatchType::Exact,
        },
        MatchClassification {
            id: TripId::new("algiers-tunis"),
            match_type: MatchType::Country,
        },
        MatchClassification {
            id: TripId::new("lyon-algiers"),
            match_type: MatchType::Partial,
        },
        MatchClassification {
            id: TripId::new("gone"),
            match_type: MatchType::Exact,
        },
    ]));
    let results = service(&backend)
        .search(&SearchQuery::new("Paris", "Oran").with_language(Language::Fr))
        .await;

    assert_eq!(ids(&results.exact_matches), ["lyon-algiers", "paris-oran"]);
    assert_eq!(ids(&results.country_matches), ["algiers-tunis"]);
    assert_eq!(results.search_countries.destination, "Algérie");
    assert!(results.nearest.is_none());
}

#[tokio::test]
async fn empty_classification_falls_back() {
    let backend = backend().with_classification(ClassifyMode::Fixed(Vec::new()));
    let results = service(&backend)
        .search(&SearchQuery::new("Paris", "Oran"))
        .await;

    assert_eq!(ids(&results.exact_matches), ["paris-oran"]);
}

#[tokio::test]
async fn one_sided_search_skips_classification() {
    let backend = backend().with_classification(ClassifyMode::Fixed(vec![MatchClassification {
        id: TripId::new("oran-paris"),
        match_type: MatchType::Exact,
    }]));
    let results = service(&backend)
        .search(&SearchQuery::new("", "Oran"))
        .await;

    assert_eq!(ids(&results.exact_matches), ["paris-oran"]);
}

#[tokio::test]
async fn backend_failure_yields_empty_results() {
    let backend = backend();
    backend.set_unavailable(true);
    let results = service(&backend)
        .search(&SearchQuery::new("Paris", "Oran"))
        .await;

    assert!(results.is_empty());
    assert!(backend.call_count() > 0);
}

#[tokio::test]
async fn search_latest_keeps_lone_request() {
    let backend = backend();
    let results = service(&backend)
        .search_latest(&SearchQuery::new("Paris", "Oran"))
        .await;
    assert_eq!(results.map(|r| r.total()), Some(2));
}

#[tokio::test]
async fn suggestions_are_cached() {
    let backend = backend();
    let service = service(&backend);

    let first = service.suggest("al", Language::Fr).await;
    let calls = backend.call_count();
    let second = service.suggest(" AL ", Language::Fr).await;

    assert_eq!(backend.call_count(), calls);
    assert_eq!(first, second);
    assert!(first.iter().any(|s| s.kind == LocationKind::Country && s.name == "Algérie"));
    assert!(first.iter().any(|s| s.display == "Algiers, Algérie"));

    let cities_first = first
        .iter()
        .position(|s| s.kind == LocationKind::Country)
        .unwrap();
    assert!(first[..cities_first].iter().all(|s| s.kind == LocationKind::City));
}

#[tokio::test]
async fn short_suggestion_queries_skip_the_backend() {
    let backend = backend();
    let service = SearchService::new(
        backend.clone(),
        CatalogCache::new(),
        SearchConfig::default().with_min_query_chars(3),
    );

    assert!(service.suggest("pa", Language::En).await.is_empty());
    assert!(service.suggest("   ", Language::En).await.is_empty());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn failed_suggestions_are_not_cached() {
    let backend = backend();
    let service = service(&backend);

    backend.set_unavailable(true);
    assert!(service.suggest("paris", Language::En).await.is_empty());

    backend.set_unavailable(false);
    let hits = service.suggest("paris", Language::En).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].display, "Paris, France");
}

fn new_trip(stops: &[i64]) -> NewTrip {
    NewTrip {
        full_name: "Karim Benali".to_string(),
        phone: "+33 6 12 34 56 78".to_string(),
        whatsapp: true,
        messenger: None,
        departure_date: Some(date(6, 1)),
        notes: "Small parcels only".to_string(),
        stops: stops
            .iter()
            .map(|&city| NewStop {
                city: Some(CityId(city)),
                ..Default::default()
            })
            .collect(),
        price_per_kg: None,
        currency: Currency::Eur,
    }
}

#[tokio::test]
async fn duplicate_city_is_rejected_before_saving() {
    let backend = backend();
    let before = backend.trips().len();

    let err = service(&backend)
        .create_trip(&new_trip(&[PARIS, MARSEILLE, PARIS]))
        .await
        .unwrap_err();

    match err {
        CreateTripError::Invalid(errors) => {
            assert!(errors.contains(&ValidationIssue::DuplicateCity(CityId(PARIS))));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(backend.trips().len(), before);
}

#[tokio::test]
async fn created_trip_is_searchable() {
    let backend = backend();
    let service = service(&backend);

    let id = service
        .create_trip(&new_trip(&[LYON, TUNIS]))
        .await
        .unwrap();
    assert_eq!(id, TripId::new("mock-1"));

    let stored = service.trip(&id).await.unwrap().unwrap();
    assert_eq!(stored.origin().role, StopRole::Pickup);
    assert_eq!(stored.destination().place.country, CountryId(TN));
    assert_eq!(stored.contacts.len(), 2);

    let results = service.search(&SearchQuery::new("Lyon", "Tunis")).await;
    assert_eq!(ids(&results.exact_matches), ["mock-1"]);
}

#[tokio::test]
async fn unknown_trip_is_none() {
    let backend = backend();
    assert!(service(&backend)
        .trip(&TripId::new("missing"))
        .await
        .unwrap()
        .is_none());
}
