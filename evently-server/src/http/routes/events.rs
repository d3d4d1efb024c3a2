//! Public event endpoints - the anonymous browsing surface

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::repos::EventRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::models::{Event, Page, PageParams, Paged};
use crate::state::AppState;

/// Event as the frontend consumes it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: String,
    pub organizer_id: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at.to_rfc3339(),
            organizer_id: event.organizer_id.to_string(),
        }
    }
}

/// GET / - upcoming events, soonest first
async fn list_upcoming(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paged<EventResponse>>, ApiError> {
    let pool = state.db().get().await?;
    let page = Page::from(params);

    let events = EventRepo::new(&pool).list_upcoming(page).await?;
    Ok(Json(events.map(EventResponse::from)))
}

/// GET /events/{id} - event detail
async fn event_detail(
    State(state): State<AppState>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<EventResponse>, ApiError> {
    let pool = state.db().get().await?;

    let event = EventRepo::new(&pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "event",
            id: id.to_string(),
        })?;

    Ok(Json(EventResponse::from(event)))
}

/// Event routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_upcoming))
        .route("/events/{id}", get(event_detail))
}
