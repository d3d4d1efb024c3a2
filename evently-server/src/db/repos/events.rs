//! Event repository

use evently_core::identity::UserId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Event, Page, Paged};

pub struct EventRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, location, starts_at, organizer_id, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(map_event))
    }

    /// Upcoming events, soonest first. The home page listing.
    pub async fn list_upcoming(&self, page: Page) -> Result<Paged<Event>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, title, description, location, starts_at, organizer_id, created_at,
                COUNT(*) OVER() AS total
            FROM events
            WHERE starts_at >= NOW()
            ORDER BY starts_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(paged(rows, page))
    }

    /// Events a user organizes, newest start date first.
    pub async fn list_by_organizer(
        &self,
        organizer: UserId,
        page: Page,
    ) -> Result<Paged<Event>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, title, description, location, starts_at, organizer_id, created_at,
                COUNT(*) OVER() AS total
            FROM events
            WHERE organizer_id = $1
            ORDER BY starts_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organizer.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(paged(rows, page))
    }
}

fn paged(rows: Vec<PgRow>, page: Page) -> Paged<Event> {
    let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
    let data = rows.iter().map(map_event).collect();
    Paged::new(data, total, page)
}

fn map_event(row: &PgRow) -> Event {
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        location: row.get("location"),
        starts_at: row.get("starts_at"),
        organizer_id: UserId::new(row.get("organizer_id")),
        created_at: row.get("created_at"),
    }
}
