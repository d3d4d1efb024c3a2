//! Profile endpoint - purchased tickets and organized events
//!
//! Protected: the gate guarantees an authenticated identity before this
//! handler runs. Resolution from external identity to our account goes
//! through the `users` table; a signed-in principal with no row gets the
//! degraded "contact support" response, never a crash.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{EventRepo, OrderRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::Authenticated;
use crate::http::routes::events::EventResponse;
use crate::models::{Page, Paged, Ticket};
use crate::state::AppState;

/// Both profile collections show a short page.
const PROFILE_PER_PAGE: u32 = 3;

/// Pagination for the two collections, independent of each other.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileParams {
    pub orders_page: Option<u32>,
    pub events_page: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub first_name: String,
    pub email: String,
}

/// A purchased ticket as the frontend consumes it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub event_id: String,
    pub event_title: String,
    pub event_starts_at: String,
    pub total_cents: i64,
    pub purchased_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id.to_string(),
            event_id: ticket.event_id.to_string(),
            event_title: ticket.event_title,
            event_starts_at: ticket.event_starts_at.to_rfc3339(),
            total_cents: ticket.total_cents,
            purchased_at: ticket.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: ProfileUser,
    pub tickets: Paged<TicketResponse>,
    pub organized: Paged<EventResponse>,
}

/// GET /profile
async fn profile(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Query(params): Query<ProfileParams>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let pool = state.db().get().await?;

    let user = UserRepo::new(&pool)
        .find_by_external_id(&identity.id)
        .await?
        .ok_or(ApiError::IdentityUnresolved)?;

    let orders_page = Page::new(params.orders_page.unwrap_or(1), PROFILE_PER_PAGE);
    let events_page = Page::new(params.events_page.unwrap_or(1), PROFILE_PER_PAGE);

    let tickets = OrderRepo::new(&pool)
        .list_by_buyer(user.id, orders_page)
        .await?;
    let organized = EventRepo::new(&pool)
        .list_by_organizer(user.id, events_page)
        .await?;

    Ok(Json(ProfileResponse {
        user: ProfileUser {
            first_name: user.display_name().to_string(),
            email: user.email.clone(),
        },
        tickets: tickets.map(TicketResponse::from),
        organized: organized.map(EventResponse::from),
    }))
}

/// Profile routes
pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}
