use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use diaspora_link::backend::{Backend, BackendClient, MockBackend};
use diaspora_link::cache::SuggestionCacheConfig;
use diaspora_link::catalog::{CatalogCache, CatalogSnapshot};
use diaspora_link::config::{AppConfig, BackendMode};
use diaspora_link::search::{SearchConfig, SearchService};
use diaspora_link::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let backend = match config.backend {
        BackendMode::Remote(backend_config) => {
            tracing::info!(url = %backend_config.base_url, "using hosted backend");
            Backend::Remote(BackendClient::new(backend_config)?)
        }
        BackendMode::Mock(dir) => {
            tracing::info!(dir = %dir.display(), "using fixture backend");
            Backend::Mock(MockBackend::from_dir(&dir)?)
        }
    };

    let mut catalog = CatalogCache::new();
    if let Some(snapshot) = config.snapshot {
        tracing::info!(path = %snapshot.path.display(), "catalog snapshot enabled");
        catalog = catalog.with_snapshot(CatalogSnapshot::new(snapshot));
    }

    let service = SearchService::new(backend, catalog, SearchConfig::default())
        .with_suggestion_cache(&SuggestionCacheConfig::default());

    // Warm the catalog so the first search does not pay for it
    if let Err(e) = service.catalog().await {
        tracing::warn!(error = %e, "could not load location catalog, will retry on demand");
    }

    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "DiasporaLink listening");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/search?origin=&destination=&lang=");
    tracing::info!("  GET  /api/locations?q=&lang=");
    tracing::info!("  GET  /api/trips/:id");
    tracing::info!("  POST /api/trips");
    tracing::info!("  POST /api/trips/:id/contact/:kind");

    axum::serve(listener, app).await?;
    Ok(())
}
