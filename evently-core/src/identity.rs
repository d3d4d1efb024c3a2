//! Identity model
//!
//! Two ids with very different owners:
//! - [`ExternalUserId`]: the identity provider's id for a person. Opaque to
//!   us; it is whatever arrives in the session token's `sub` claim.
//! - [`UserId`]: our own primary key for an account. The `users` table maps
//!   one to the other; nothing outside the database layer may assume the
//!   mapping exists.
//!
//! [`IdentityProvider`] is the verification seam: the production
//! implementation checks HS256 session tokens, tests substitute their own.

use std::fmt;

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The identity provider's id for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalUserId(String);

impl ExternalUserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Our internal primary key for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a verified session token proves about the caller.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub id: ExternalUserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("no session token was presented")]
    MissingToken,

    #[error("session token is invalid")]
    InvalidToken,

    #[error("session token has expired")]
    Expired,
}

/// Verifies a session token and returns the identity it vouches for.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError>;
}

/// Claims carried by an evently session token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// External user id.
    sub: String,
    email: String,
    given_name: Option<String>,
    family_name: Option<String>,
    /// Expiration (Unix epoch seconds).
    exp: i64,
    iss: String,
}

/// HS256 session-token verification. Stateless: no lookups, the token alone
/// decides.
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::InvalidToken,
            },
        )?;

        let claims = data.claims;
        Ok(ExternalIdentity {
            id: ExternalUserId::new(claims.sub),
            email: claims.email,
            first_name: claims.given_name,
            last_name: claims.family_name,
        })
    }
}
