use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::{
    pkg::{
        internal::{adaptors::profiles::selectors::ProfileSelector, auth::User},
        server::{
            forms::empty_as_none,
            state::{AppState, GetTxn},
            uispec::{RecruitersPage, render},
        },
    },
    prelude::Result,
};

const PAGE_SIZE: i64 = 20;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub q: Option<String>,
}

/// Architects with a resume on file, then everyone else.
pub async fn page(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>> {
    let search = query.q.as_deref();
    let mut tx = state.db_pool.begin_txn().await?;
    let mut profiles = ProfileSelector::new(&mut tx);
    let with_resumes = profiles.with_resumes(search, PAGE_SIZE).await?;
    let others = profiles.others(&user.user_id, search, PAGE_SIZE).await?;
    tracing::debug!(
        "recruiter search {:?}: {} with resumes, {} others",
        search,
        with_resumes.len(),
        others.len()
    );
    render(&RecruitersPage {
        q: query.q.clone().unwrap_or_default(),
        with_resumes,
        others,
    })
}
