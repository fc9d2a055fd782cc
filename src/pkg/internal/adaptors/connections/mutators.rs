use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::connections::spec::{CONNECTION_COLUMNS, ConnectionEntry, ConnectionStatus};
use crate::prelude::Result;

pub struct ConnectionMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ConnectionMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ConnectionMutator { pool }
    }

    /// `None` when the pair already has a connection row in either direction.
    pub async fn request(&mut self, from: &Uuid, to: &Uuid) -> Result<Option<ConnectionEntry>> {
        let row = sqlx::query_as::<_, ConnectionEntry>(&format!(
            r#"
            INSERT INTO connections (id, user_id, connected_user_id, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(from)
        .bind(to)
        .bind(ConnectionStatus::Pending)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Answers a pending request `requester` sent to `recipient`.
    pub async fn respond(
        &mut self,
        requester: &Uuid,
        recipient: &Uuid,
        status: ConnectionStatus,
    ) -> Result<Option<ConnectionEntry>> {
        let row = sqlx::query_as::<_, ConnectionEntry>(&format!(
            r#"
            UPDATE connections SET status = $3, updated_at = NOW()
            WHERE user_id = $1 AND connected_user_id = $2 AND status = $4
            RETURNING {}
            "#,
            CONNECTION_COLUMNS
        ))
        .bind(requester)
        .bind(recipient)
        .bind(status)
        .bind(ConnectionStatus::Pending)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Deletes the pair's row whichever side sent it.
    pub async fn remove(&mut self, a: &Uuid, b: &Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM connections
            WHERE (user_id = $1 AND connected_user_id = $2)
               OR (user_id = $2 AND connected_user_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .execute(&mut *self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
