//! HTTP layer
//!
//! Axum server with:
//! - The route gate enforced as middleware on every request
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{serve, ServerConfig};
