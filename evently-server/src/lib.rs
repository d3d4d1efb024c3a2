//! evently-server: HTTP backend for the evently ticketing app
//!
//! The interesting machinery lives in two places:
//! - [`db::ConnectionCache`]: the process-wide database handle. One live
//!   handle, one in-flight attempt, every concurrent caller converges on
//!   the same outcome.
//! - [`gate`]: classifies every request path as public or protected before
//!   any handler runs, and enforces the answer.
//!
//! Everything else is the service around them: repositories, route
//! handlers, and the JSON error surface.

pub mod db;
pub mod gate;
pub mod http;
pub mod models;
pub mod state;

pub use http::{serve, ApiError, ServerConfig};
pub use state::AppState;
