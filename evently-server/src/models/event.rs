//! Event model

use chrono::{DateTime, Utc};
use evently_core::identity::UserId;
use uuid::Uuid;

/// An event someone can buy tickets for.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub organizer_id: UserId,
    pub created_at: DateTime<Utc>,
}
