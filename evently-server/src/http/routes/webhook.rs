//! Identity-provider webhook
//!
//! The provider calls back on account changes; this is where the mapping
//! from external identity to our own user row is born. The route is public
//! (machines have no session) and guarded instead by a shared secret header
//! when one is configured.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use evently_core::identity::ExternalUserId;

use crate::db::repos::UserRepo;
use crate::http::error::ApiError;
use crate::models::user::is_valid_email;
use crate::state::AppState;

/// Header carrying the shared webhook secret.
const SECRET_HEADER: &str = "x-webhook-secret";

/// Address recorded when the provider supplies none.
const FALLBACK_EMAIL: &str = "no-email@unknown";

#[derive(Debug, Deserialize)]
struct EmailAddress {
    id: String,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    primary_email_address_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl UserPayload {
    /// The address flagged as primary, else the first one, else the
    /// fallback constant.
    fn primary_email(&self) -> &str {
        let flagged = self.primary_email_address_id.as_ref().and_then(|primary| {
            self.email_addresses
                .iter()
                .find(|address| &address.id == primary)
        });
        flagged
            .or_else(|| self.email_addresses.first())
            .map(|address| address.email_address.as_str())
            .unwrap_or(FALLBACK_EMAIL)
    }
}

#[derive(Debug, Deserialize)]
struct DeletedPayload {
    id: String,
}

/// Deliveries we act on. Unknown types are acknowledged and ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data")]
enum WebhookEvent {
    #[serde(rename = "user.created")]
    UserCreated(UserPayload),
    #[serde(rename = "user.updated")]
    UserUpdated(UserPayload),
    #[serde(rename = "user.deleted")]
    UserDeleted(DeletedPayload),
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/webhook/clerk
async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<WebhookEvent>,
) -> Result<Json<WebhookAck>, ApiError> {
    verify_secret(&state, &headers)?;

    match event {
        WebhookEvent::UserCreated(payload) | WebhookEvent::UserUpdated(payload) => {
            let email = payload.primary_email().to_owned();
            if !is_valid_email(&email) {
                return Err(ApiError::BadRequest(format!(
                    "'{email}' is not a usable email address"
                )));
            }

            let pool = state.db().get().await?;
            let external_id = ExternalUserId::new(payload.id);
            let user = UserRepo::new(&pool)
                .upsert(
                    &external_id,
                    &email,
                    payload.first_name.as_deref(),
                    payload.last_name.as_deref(),
                )
                .await?;
            tracing::info!(external_id = %external_id, user_id = %user.id, "user synced from identity provider");
        }
        WebhookEvent::UserDeleted(payload) => {
            let pool = state.db().get().await?;
            let external_id = ExternalUserId::new(payload.id);
            let removed = UserRepo::new(&pool)
                .delete_by_external_id(&external_id)
                .await?;
            tracing::info!(external_id = %external_id, removed, "user deletion processed");
        }
        WebhookEvent::Ignored => {
            tracing::debug!("ignoring webhook delivery of unhandled type");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Constant-time check of the shared secret header. A missing configured
/// secret disables verification (the server warned at startup).
fn verify_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.webhook_secret() else {
        return Ok(());
    };

    let presented = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!("webhook delivery rejected: bad or missing secret");
        Err(ApiError::Unauthorized)
    }
}

/// Webhook routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/webhook/clerk", post(receive))
}
