//! Lazily populated, process-wide catalog handle.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::backend::CatalogSource;

use super::error::CatalogError;
use super::snapshot::CatalogSnapshot;
use super::store::LocationCatalog;

/// Read-through cache for the location catalog.
///
/// The first caller populates it; concurrent first callers wait on the
/// same population instead of fetching twice. Once loaded the catalog is
/// never invalidated. A failed population leaves the cache empty so a
/// later call can retry.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cell: OnceCell<Arc<LocationCatalog>>,
    snapshot: Option<CatalogSnapshot>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from and write to `snapshot` when populating.
    pub fn with_snapshot(mut self, snapshot: CatalogSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// A cache that is already populated.
    pub fn preloaded(catalog: LocationCatalog) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(catalog))),
            snapshot: None,
        }
    }

    /// The catalog, if it has been loaded.
    pub fn get(&self) -> Option<Arc<LocationCatalog>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// The catalog, populating it from the snapshot or `source` on first use.
    pub async fn get_or_load<S: CatalogSource>(
        &self,
        source: &S,
    ) -> Result<Arc<LocationCatalog>, CatalogError> {
        self.cell
            .get_or_try_init(|| self.populate(source))
            .await
            .cloned()
    }

    async fn populate<S: CatalogSource>(
        &self,
        source: &S,
    ) -> Result<Arc<LocationCatalog>, CatalogError> {
        if let Some(catalog) = self.snapshot.as_ref().and_then(CatalogSnapshot::load) {
            tracing::info!(
                countries = catalog.countries().len(),
                cities = catalog.cities().len(),
                "loaded location catalog from snapshot"
            );
            return Ok(Arc::new(catalog));
        }

        let (countries, cities) =
            futures::try_join!(source.fetch_countries(), source.fetch_cities())?;
        let catalog = LocationCatalog::new(countries, cities);

        tracing::info!(
            countries = catalog.countries().len(),
            cities = catalog.cities().len(),
            "fetched location catalog"
        );

        if let Some(snapshot) = &self.snapshot
            && let Err(e) = snapshot.save(&catalog)
        {
            tracing::warn!(path = %snapshot.path().display(), error = %e, "failed to write catalog snapshot");
        }

        Ok(Arc::new(catalog))
    }
}
