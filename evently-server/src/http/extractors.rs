//! Custom Axum extractors

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use evently_core::identity::ExternalIdentity;
use uuid::Uuid;

use super::error::ApiError;

/// The identity the gate middleware attached after verifying the session
/// token. Rejects with 401 when the request reached the handler anonymously
/// (possible on public routes).
pub struct Authenticated(pub ExternalIdentity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ExternalIdentity>()
            .cloned()
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extract and validate a UUID from the path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("missing id".to_string()))?;

        let uuid = Uuid::parse_str(&id)
            .map_err(|_| ApiError::BadRequest(format!("'{id}' is not a valid id")))?;

        Ok(Self(uuid))
    }
}
