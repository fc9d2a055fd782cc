use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::connections::spec::{
    CONNECTION_COLUMNS, ConnectionEntry, ConnectionStatus, PeerConnection, PeerRow,
};
use crate::prelude::Result;

pub struct ConnectionSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ConnectionSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ConnectionSelector { pool }
    }

    /// The request `from` sent to `to`, if any.
    pub async fn sent(&mut self, from: &Uuid, to: &Uuid) -> Result<Option<ConnectionEntry>> {
        let row = sqlx::query_as::<_, ConnectionEntry>(&format!(
            "SELECT {} FROM connections WHERE user_id = $1 AND connected_user_id = $2",
            CONNECTION_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Accepted connections in either direction, newest first.
    pub async fn accepted_for(&mut self, user_id: &Uuid) -> Result<Vec<PeerConnection>> {
        let rows = sqlx::query_as::<_, PeerRow>(
            r#"
            SELECT c.id, c.status, c.created_at,
                   p.id AS peer_id, p.full_name AS peer_full_name,
                   p.title AS peer_title, p.avatar_url AS peer_avatar_url
            FROM connections c
            JOIN profiles p ON p.id = CASE WHEN c.user_id = $1 THEN c.connected_user_id ELSE c.user_id END
            WHERE (c.user_id = $1 OR c.connected_user_id = $1) AND c.status = $2
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(ConnectionStatus::Accepted)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows.into_iter().map(PeerConnection::from).collect())
    }

    /// Pending requests other people sent to `user_id`.
    pub async fn incoming_pending(&mut self, user_id: &Uuid) -> Result<Vec<PeerConnection>> {
        let rows = sqlx::query_as::<_, PeerRow>(
            r#"
            SELECT c.id, c.status, c.created_at,
                   p.id AS peer_id, p.full_name AS peer_full_name,
                   p.title AS peer_title, p.avatar_url AS peer_avatar_url
            FROM connections c
            JOIN profiles p ON p.id = c.user_id
            WHERE c.connected_user_id = $1 AND c.status = $2
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(ConnectionStatus::Pending)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows.into_iter().map(PeerConnection::from).collect())
    }
}
