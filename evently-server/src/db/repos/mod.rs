//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Handles conflicts via ON CONFLICT (no check-then-insert)
//! - Totals come from COUNT(*) OVER() on the listing query itself

pub mod events;
pub mod orders;
pub mod users;

pub use events::EventRepo;
pub use orders::OrderRepo;
pub use users::UserRepo;
