//! Order repository

use evently_core::identity::UserId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::{Page, Paged, Ticket};

pub struct OrderRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Tickets a user bought, newest purchase first, each joined with its
    /// event.
    pub async fn list_by_buyer(
        &self,
        buyer: UserId,
        page: Page,
    ) -> Result<Paged<Ticket>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.id,
                o.event_id,
                e.title AS event_title,
                e.starts_at AS event_starts_at,
                o.total_cents,
                o.created_at,
                COUNT(*) OVER() AS total
            FROM orders o
            JOIN events e ON e.id = o.event_id
            WHERE o.buyer_id = $1
            ORDER BY o.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(buyer.as_uuid())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let data = rows.iter().map(map_ticket).collect();
        Ok(Paged::new(data, total, page))
    }
}

fn map_ticket(row: &PgRow) -> Ticket {
    Ticket {
        id: row.get("id"),
        event_id: row.get("event_id"),
        event_title: row.get("event_title"),
        event_starts_at: row.get("event_starts_at"),
        total_cents: row.get("total_cents"),
        created_at: row.get("created_at"),
    }
}
