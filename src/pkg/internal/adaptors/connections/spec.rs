use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::pkg::internal::adaptors::profiles::spec::AuthorSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "connection_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Pending => write!(f, "pending"),
            ConnectionStatus::Accepted => write!(f, "accepted"),
            ConnectionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// `user_id` asked `connected_user_id` to connect.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub connected_user_id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A connection joined with the profile on the other side from the viewer.
#[derive(FromRow)]
pub struct PeerRow {
    pub id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub peer_id: Uuid,
    pub peer_full_name: String,
    pub peer_title: Option<String>,
    pub peer_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerConnection {
    pub id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub peer: AuthorSummary,
}

impl From<PeerRow> for PeerConnection {
    fn from(row: PeerRow) -> Self {
        PeerConnection {
            id: row.id,
            status: row.status,
            created_at: row.created_at,
            peer: AuthorSummary {
                id: row.peer_id,
                full_name: row.peer_full_name,
                title: row.peer_title,
                avatar_url: row.peer_avatar_url,
            },
        }
    }
}

pub const CONNECTION_COLUMNS: &str = "id, user_id, connected_user_id, status, created_at, updated_at";
