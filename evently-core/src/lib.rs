//! evently-core: shared foundation for the evently services
//!
//! Holds the pieces every other crate needs:
//! - Environment-driven configuration ([`AppConfig`])
//! - The identity model: external identity (what the identity provider
//!   vouches for) vs. internal user id (our own primary key), plus the
//!   [`IdentityProvider`] seam and its JWT-backed implementation.

pub mod config;
pub mod identity;

pub use config::{AppConfig, ConfigError};
pub use identity::{
    ExternalIdentity, ExternalUserId, IdentityError, IdentityProvider, JwtIdentityProvider, UserId,
};
