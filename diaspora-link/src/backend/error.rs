//! Backend client error types.

/// Errors from the hosted backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", .body.as_deref().map(|b| format!(" (body: {b})")).unwrap_or_default())]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Backend returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend
    #[error("rate limited by backend")]
    RateLimited,

    /// Invalid API key or unauthorized
    #[error("unauthorized: check DIASPORA_BACKEND_KEY")]
    Unauthorized,

    /// Backend is not configured or is unavailable
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The trip row was written but its stops or contacts were not
    #[error("trip {trip_id} saved without its route: {source}")]
    IncompleteTrip {
        trip_id: String,
        source: Box<BackendError>,
    },
}
