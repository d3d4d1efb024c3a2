//! Order model
//!
//! A purchased ticket, already joined with the event it admits to - the
//! profile page never needs an order without its event.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_starts_at: DateTime<Utc>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}
