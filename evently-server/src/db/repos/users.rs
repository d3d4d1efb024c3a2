//! User repository
//!
//! The only writer is the identity-provider webhook; everything else reads.

use evently_core::identity::{ExternalUserId, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::User;

pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or refresh the account for an external identity.
    pub async fn upsert(
        &self,
        external_id: &ExternalUserId,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (external_id, email, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name
            RETURNING id, external_id, email, first_name, last_name, created_at
            "#,
        )
        .bind(external_id.as_str())
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(self.pool)
        .await?;

        Ok(map_user(&row))
    }

    /// Resolve an external identity to our account, if one exists.
    pub async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, external_id, email, first_name, last_name, created_at
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(external_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// Remove the account for a deleted external identity.
    ///
    /// Idempotent - returns false when there was nothing to remove.
    pub async fn delete_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE external_id = $1")
            .bind(external_id.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_user(row: &PgRow) -> User {
    User {
        id: UserId::new(row.get("id")),
        external_id: ExternalUserId::new(row.get::<String, _>("external_id")),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
    }
}
