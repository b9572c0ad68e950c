//! City and country reference data.
//!
//! The catalog is fetched once per process (or read from an on-disk
//! snapshot) and shared read-only by every search.

mod error;
mod hit;
mod lazy;
mod snapshot;
mod store;

pub use error::CatalogError;
pub use hit::{LocationHit, LocationKind, LocationSuggestion, SuggestLimits};
pub use lazy::CatalogCache;
pub use snapshot::{CatalogSnapshot, SnapshotConfig};
pub use store::LocationCatalog;
