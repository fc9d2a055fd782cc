use std::sync::Arc;

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
};
use standard_error::{StandardError, Status};

use crate::{
    conf::settings,
    pkg::{
        internal::{
            adaptors::{posts::selectors::FeedSelector, profiles::selectors::ProfileSelector},
            auth::User,
            gate::DASHBOARD,
        },
        server::{
            state::{AppState, GetTxn},
            uispec::{Dashboard, render},
        },
    },
    prelude::Result,
};

pub async fn home() -> Redirect {
    Redirect::to(DASHBOARD)
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Html<String>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let profile = ProfileSelector::new(&mut tx)
        .get_by_id(&user.user_id)
        .await?
        .ok_or_else(|| StandardError::new("ERR-PROFILE-001").code(StatusCode::NOT_FOUND))?;
    let feed = FeedSelector::new(&mut tx)
        .recent(&user.user_id, settings.feed_page_size)
        .await?;
    tracing::debug!("dashboard for {} with {} posts", &user.email, feed.len());
    render(&Dashboard { profile, feed })
}
