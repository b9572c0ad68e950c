//! Trip search.
//!
//! Answers "which posted trips can carry a parcel from here to there?".
//! Free-text locations are resolved to cities or countries, then trips are
//! split into exact matches (serving both locations) and country matches
//! (touching both countries), either by the backend's classification
//! procedure or by filtering active trips locally.

mod config;
mod filter;
mod matcher;
mod orchestrator;
mod rank;
mod resolver;
mod tracker;

#[cfg(test)]
mod orchestrator_tests;

pub use config::{FallbackScope, SearchConfig};
pub use filter::{FilterOutcome, NearestCity, NearestPair, filter_trips};
pub use matcher::{SearchLocation, matches_dropoff, matches_pickup};
pub use orchestrator::{
    CreateTripError, SearchCountries, SearchError, SearchQuery, SearchResults, SearchService,
};
pub use rank::{rank_country_matches, score_country_match};
pub use resolver::{LocationResolver, ResolvedLocation};
pub use tracker::{RequestToken, RequestTracker};
