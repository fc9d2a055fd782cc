use serde::Serialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::connections::{
        selectors::ConnectionSelector,
        spec::{ConnectionEntry, ConnectionStatus, PeerConnection},
    },
    prelude::Result,
};

/// Peers already connected to the viewer or waiting on the viewer's answer.
pub fn known_peers(accepted: &[PeerConnection], pending: &[PeerConnection]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = accepted.iter().chain(pending).map(|c| c.peer.id).collect();
    ids.sort();
    ids.dedup();
    ids
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// How the viewer stands with another profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Relation {
    #[serde(rename = "self")]
    Myself,
    #[serde(rename = "none")]
    NotConnected,
    Pending { direction: Direction },
    Accepted { direction: Direction },
    Rejected { direction: Direction },
}

impl Relation {
    pub fn resolve(
        me: &Uuid,
        other: &Uuid,
        sent: Option<&ConnectionEntry>,
        received: Option<&ConnectionEntry>,
    ) -> Self {
        if me == other {
            return Relation::Myself;
        }
        let found = sent
            .map(|c| (c.status, Direction::Outgoing))
            .or_else(|| received.map(|c| (c.status, Direction::Incoming)));
        match found {
            None => Relation::NotConnected,
            Some((ConnectionStatus::Pending, direction)) => Relation::Pending { direction },
            Some((ConnectionStatus::Accepted, direction)) => Relation::Accepted { direction },
            Some((ConnectionStatus::Rejected, direction)) => Relation::Rejected { direction },
        }
    }

    /// Looks the pair up with at most two point queries, sent side first.
    pub async fn lookup(conn: &mut PgConnection, me: &Uuid, other: &Uuid) -> Result<Self> {
        if me == other {
            return Ok(Relation::Myself);
        }
        let mut selector = ConnectionSelector::new(conn);
        if let Some(sent) = selector.sent(me, other).await? {
            return Ok(Relation::resolve(me, other, Some(&sent), None));
        }
        let received = selector.sent(other, me).await?;
        Ok(Relation::resolve(me, other, None, received.as_ref()))
    }

    pub fn can_request(&self) -> bool {
        matches!(self, Relation::NotConnected)
    }

    pub fn can_respond(&self) -> bool {
        matches!(
            self,
            Relation::Pending {
                direction: Direction::Incoming
            }
        )
    }

    /// Cancel an outgoing request, drop a connection or clear a rejection.
    pub fn can_remove(&self) -> bool {
        matches!(
            self,
            Relation::Pending {
                direction: Direction::Outgoing
            } | Relation::Accepted { .. }
                | Relation::Rejected { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Relation::Myself => "",
            Relation::NotConnected => "Connect",
            Relation::Pending {
                direction: Direction::Outgoing,
            } => "Cancel Request",
            Relation::Pending {
                direction: Direction::Incoming,
            } => "Respond",
            Relation::Accepted { .. } => "Connected",
            Relation::Rejected { .. } => "Rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::pkg::internal::adaptors::profiles::spec::AuthorSummary;

    fn entry(from: Uuid, to: Uuid, status: ConnectionStatus) -> ConnectionEntry {
        ConnectionEntry {
            id: Uuid::new_v4(),
            user_id: from,
            connected_user_id: to,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn peer(id: Uuid, status: ConnectionStatus) -> PeerConnection {
        PeerConnection {
            id: Uuid::new_v4(),
            status,
            created_at: Utc::now(),
            peer: AuthorSummary {
                id,
                full_name: "Lina Bo Bardi".into(),
                title: None,
                avatar_url: None,
            },
        }
    }

    #[test]
    fn test_known_peers_cover_connections_and_incoming_requests() {
        let (friend, asking) = (Uuid::new_v4(), Uuid::new_v4());
        let accepted = vec![peer(friend, ConnectionStatus::Accepted)];
        let pending = vec![
            peer(asking, ConnectionStatus::Pending),
            peer(friend, ConnectionStatus::Pending),
        ];
        let known = known_peers(&accepted, &pending);
        assert_eq!(known.len(), 2);
        assert!(known.contains(&friend));
        assert!(known.contains(&asking));
        assert!(known_peers(&[], &[]).is_empty());
    }

    #[test]
    fn test_own_profile_resolves_to_myself() {
        let me = Uuid::new_v4();
        assert_eq!(Relation::resolve(&me, &me, None, None), Relation::Myself);
        assert!(!Relation::Myself.can_request());
    }

    #[test]
    fn test_no_rows_means_not_connected() {
        let (me, other) = (Uuid::new_v4(), Uuid::new_v4());
        let r = Relation::resolve(&me, &other, None, None);
        assert_eq!(r, Relation::NotConnected);
        assert!(r.can_request());
    }

    #[test]
    fn test_sent_request_wins_over_received() {
        let (me, other) = (Uuid::new_v4(), Uuid::new_v4());
        let sent = entry(me, other, ConnectionStatus::Pending);
        let received = entry(other, me, ConnectionStatus::Accepted);
        let r = Relation::resolve(&me, &other, Some(&sent), Some(&received));
        assert_eq!(
            r,
            Relation::Pending {
                direction: Direction::Outgoing
            }
        );
        assert!(r.can_remove());
        assert!(!r.can_respond());
    }

    #[test]
    fn test_incoming_pending_can_be_answered() {
        let (me, other) = (Uuid::new_v4(), Uuid::new_v4());
        let received = entry(other, me, ConnectionStatus::Pending);
        let r = Relation::resolve(&me, &other, None, Some(&received));
        assert!(r.can_respond());
        assert!(!r.can_remove());
        assert_eq!(r.label(), "Respond");
    }

    #[test]
    fn test_status_json_shape() -> core::result::Result<(), serde_json::Error> {
        let r = Relation::Accepted {
            direction: Direction::Incoming,
        };
        assert_eq!(
            serde_json::to_value(r)?,
            serde_json::json!({"status": "accepted", "direction": "incoming"})
        );
        assert_eq!(
            serde_json::to_value(Relation::NotConnected)?,
            serde_json::json!({"status": "none"})
        );
        Ok(())
    }
}
