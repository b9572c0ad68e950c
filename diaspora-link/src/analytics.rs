//! Usage analytics: searches, trip views and contact clicks.
//!
//! Recording is best effort. Failures are logged and never reach the
//! caller.

use serde::Serialize;

use crate::backend::TripStore;
use crate::domain::{ContactKind, TripId};

/// Coarse client classification derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Desktop,
}

impl DeviceType {
    const MOBILE_MARKERS: [&'static str; 4] = ["Mobile", "Android", "iPhone", "iPad"];

    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if Self::MOBILE_MARKERS.iter().any(|m| ua.contains(m)) => DeviceType::Mobile,
            _ => DeviceType::Desktop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Desktop => "desktop",
        }
    }
}

/// A search as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEvent {
    pub origin_query: String,
    pub destination_query: String,
    pub results_count: usize,
    pub user_agent: Option<String>,
    pub device_type: DeviceType,
}

impl SearchEvent {
    pub fn new(
        origin_query: impl Into<String>,
        destination_query: impl Into<String>,
        results_count: usize,
        user_agent: Option<String>,
    ) -> Self {
        let device_type = DeviceType::from_user_agent(user_agent.as_deref());
        Self {
            origin_query: origin_query.into(),
            destination_query: destination_query.into(),
            results_count,
            user_agent,
            device_type,
        }
    }
}

/// A trip detail page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripViewEvent {
    pub trip_id: TripId,
    pub user_agent: Option<String>,
    pub device_type: DeviceType,
}

impl TripViewEvent {
    pub fn new(trip_id: TripId, user_agent: Option<String>) -> Self {
        let device_type = DeviceType::from_user_agent(user_agent.as_deref());
        Self {
            trip_id,
            user_agent,
            device_type,
        }
    }
}

pub async fn record_search<S: TripStore>(store: &S, event: SearchEvent) {
    if let Err(e) = store.log_search(&event).await {
        tracing::warn!(
            origin = %event.origin_query,
            destination = %event.destination_query,
            error = %e,
            "failed to log search"
        );
    }
}

pub async fn record_trip_view<S: TripStore>(store: &S, event: TripViewEvent) {
    if let Err(e) = store.log_trip_view(&event).await {
        tracing::warn!(trip_id = %event.trip_id, error = %e, "failed to log trip view");
    }
}

pub async fn record_contact_click<S: TripStore>(store: &S, trip: &TripId, kind: ContactKind) {
    if let Err(e) = store.log_contact_click(trip, kind).await {
        tracing::warn!(trip_id = %trip, kind = %kind, error = %e, "failed to log contact click");
    }
}
