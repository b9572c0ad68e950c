//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analytics::{
    SearchEvent, TripViewEvent, record_contact_click, record_search, record_trip_view,
};
use crate::backend::BackendError;
use crate::catalog::LocationCatalog;
use crate::domain::{ContactKind, Language, NewTrip, TripId, ValidationErrors};
use crate::search::{CreateTripError, SearchQuery};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search_trips))
        .route("/api/locations", get(suggest_locations))
        .route("/api/trips", post(create_trip))
        .route("/api/trips/:id", get(trip_detail))
        .route("/api/trips/:id/contact/:kind", post(contact_click))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The catalog for rendering names. Rendering degrades to ids without it.
async fn display_catalog(state: &AppState) -> Arc<LocationCatalog> {
    state.service.catalog().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "location catalog unavailable for display");
        Arc::default()
    })
}

/// Search trips between two free-text locations. Never fails.
async fn search_trips(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let language = Language::parse_or_default(params.lang.as_deref());
    let query = SearchQuery::new(params.origin, params.destination).with_language(language);

    let results = state.service.search(&query).await;
    let catalog = display_catalog(&state).await;
    let response =
        SearchResponse::from_results(&results, &catalog, language, Local::now().date_naive());

    if !query.origin.trim().is_empty() || !query.destination.trim().is_empty() {
        let event = SearchEvent::new(
            query.origin.trim(),
            query.destination.trim(),
            results.total(),
            user_agent(&headers),
        );
        let service = state.service.clone();
        tokio::spawn(async move { record_search(service.source(), event).await });
    }

    Json(response)
}

/// Location autocomplete.
async fn suggest_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Json<LocationsResponse> {
    let language = Language::parse_or_default(params.lang.as_deref());
    let locations = state.service.suggest(&params.q, language).await;
    Json(LocationsResponse {
        locations: locations.as_ref().clone(),
    })
}

/// A single trip. Records a view.
async fn trip_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<Json<TripView>, AppError> {
    let language = Language::parse_or_default(params.lang.as_deref());
    let id = TripId::new(id);
    let trip = state
        .service
        .trip(&id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Trip not found: {id}"),
        })?;

    let catalog = display_catalog(&state).await;
    let view = TripView::from_trip(&trip, &catalog, language, Local::now().date_naive());

    let event = TripViewEvent::new(id, user_agent(&headers));
    let service = state.service.clone();
    tokio::spawn(async move { record_trip_view(service.source(), event).await });

    Ok(Json(view))
}

/// Create a trip from the carrier form.
async fn create_trip(
    State(state): State<AppState>,
    Json(trip): Json<NewTrip>,
) -> Result<(StatusCode, Json<CreateTripResponse>), AppError> {
    let id = state.service.create_trip(&trip).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateTripResponse { id: id.to_string() }),
    ))
}

/// Record a contact click and return the deep link to open.
async fn contact_click(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<ContactLinkResponse>, AppError> {
    let kind: ContactKind = kind.parse().map_err(|e| AppError::BadRequest {
        message: format!("{e}"),
    })?;
    let id = TripId::new(id);
    let trip = state
        .service
        .trip(&id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Trip not found: {id}"),
        })?;
    let contact = trip
        .contacts
        .iter()
        .find(|c| c.kind == kind)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Trip {id} has no {kind} contact"),
        })?;
    let link = contact.link();

    let service = state.service.clone();
    tokio::spawn(async move { record_contact_click(service.source(), &id, kind).await });

    Ok(Json(ContactLinkResponse { link }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Validation(ValidationErrors),
    NotFound { message: String },
    Internal { message: String },
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(message) => AppError::NotFound { message },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<CreateTripError> for AppError {
    fn from(e: CreateTripError) -> Self {
        match e {
            CreateTripError::Invalid(errors) => AppError::Validation(errors),
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, issues) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, Vec::new()),
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, errors.to_string(), errors.0)
            }
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, Vec::new()),
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new())
            }
        };

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            issues,
        });
        (status, body).into_response()
    }
}
