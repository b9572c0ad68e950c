//! Application state for the web layer.

use std::sync::Arc;

use crate::backend::Backend;
use crate::search::SearchService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Search, suggestions and trip creation over the configured backend
    pub service: Arc<SearchService<Backend>>,
}

impl AppState {
    pub fn new(service: SearchService<Backend>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
