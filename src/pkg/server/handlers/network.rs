use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use standard_error::{StandardError, Status};
use uuid::Uuid;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                connections::{
                    mutators::ConnectionMutator, selectors::ConnectionSelector,
                    spec::ConnectionStatus,
                },
                profiles::selectors::ProfileSelector,
            },
            auth::User,
            network::{Relation, known_peers},
        },
        server::{
            state::{AppState, GetTxn},
            uispec::{NetworkPage, render},
        },
    },
    prelude::Result,
};

const SUGGESTIONS: i64 = 10;

pub async fn page(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Html<String>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let mut connections = ConnectionSelector::new(&mut tx);
    let accepted = connections.accepted_for(&user.user_id).await?;
    let pending = connections.incoming_pending(&user.user_id).await?;
    let known = known_peers(&accepted, &pending);
    let suggestions = ProfileSelector::new(&mut tx)
        .suggestions(&user.user_id, &known, SUGGESTIONS)
        .await?;
    render(&NetworkPage {
        connections: accepted,
        pending,
        suggestions,
    })
}

pub async fn status(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Relation>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let relation = Relation::lookup(&mut tx, &user.user_id, &profile_id).await?;
    Ok(Json(relation))
}

pub async fn request(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Relation>> {
    if profile_id == user.user_id {
        return Err(StandardError::new("ERR-CONN-001").code(StatusCode::BAD_REQUEST));
    }
    let mut tx = state.db_pool.begin_txn().await?;
    ProfileSelector::new(&mut tx)
        .get_by_id(&profile_id)
        .await?
        .ok_or_else(|| StandardError::new("ERR-PROFILE-001").code(StatusCode::NOT_FOUND))?;
    let created = ConnectionMutator::new(&mut tx)
        .request(&user.user_id, &profile_id)
        .await?
        .ok_or_else(|| StandardError::new("ERR-CONN-002").code(StatusCode::CONFLICT))?;
    tx.commit().await?;
    tracing::info!("{} asked {} to connect", &user.email, &profile_id);
    Ok(Json(Relation::resolve(
        &user.user_id,
        &profile_id,
        Some(&created),
        None,
    )))
}

async fn respond(
    state: &AppState,
    user: &User,
    requester: &Uuid,
    status: ConnectionStatus,
) -> Result<Relation> {
    let mut tx = state.db_pool.begin_txn().await?;
    let answered = ConnectionMutator::new(&mut tx)
        .respond(requester, &user.user_id, status)
        .await?
        .ok_or_else(|| StandardError::new("ERR-CONN-003").code(StatusCode::NOT_FOUND))?;
    tx.commit().await?;
    tracing::info!("{} {} the request from {}", &user.email, status, requester);
    Ok(Relation::resolve(
        &user.user_id,
        requester,
        None,
        Some(&answered),
    ))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Relation>> {
    Ok(Json(
        respond(&state, &user, &profile_id, ConnectionStatus::Accepted).await?,
    ))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Relation>> {
    Ok(Json(
        respond(&state, &user, &profile_id, ConnectionStatus::Rejected).await?,
    ))
}

/// Cancels an outgoing request, drops a connection or clears a rejection.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Relation>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let removed = ConnectionMutator::new(&mut tx)
        .remove(&user.user_id, &profile_id)
        .await?;
    tx.commit().await?;
    if removed {
        tracing::info!("{} removed connection with {}", &user.email, &profile_id);
    }
    Ok(Json(Relation::NotConnected))
}
