use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use standard_error::{StandardError, Status};
use uuid::Uuid;

use crate::{
    conf::settings,
    pkg::{
        internal::{
            adaptors::posts::{
                mutators::PostMutator,
                selectors::FeedSelector,
                spec::{FeedPost, post_content},
            },
            auth::User,
            gate::DASHBOARD,
            storage::{discard, store},
            uploads::POST_IMAGE,
        },
        server::{
            forms::{MultipartForm, trimmed, wants_json},
            state::{AppState, GetTxn},
        },
    },
    prelude::Result,
};

#[derive(Deserialize)]
pub struct CommentInput {
    #[serde(deserialize_with = "trimmed")]
    pub content: String,
}

fn post_not_found() -> StandardError {
    StandardError::new("ERR-POST-003").code(StatusCode::NOT_FOUND)
}

fn back_to_post(post_id: &Uuid) -> Redirect {
    Redirect::to(&format!("{}#post-{}", DASHBOARD, post_id))
}

/// The feed as JSON, for the refresh button.
pub async fn feed(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Vec<FeedPost>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let feed = FeedSelector::new(&mut tx)
        .recent(&user.user_id, settings.feed_page_size)
        .await?;
    Ok(Json(feed))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = MultipartForm::read(multipart, "image").await?;
    let content = post_content(form.text("content"), form.file.is_some())
        .ok_or_else(|| StandardError::new("ERR-POST-001").code(StatusCode::BAD_REQUEST))?;
    let image = match form.file {
        Some(upload) => Some(store(&*state.s3_client, &POST_IMAGE, &user.user_id, upload).await?),
        None => None,
    };

    let mut tx = state.db_pool.begin_txn().await?;
    let image_url = image.as_ref().map(|i| i.url.as_str());
    let created = PostMutator::new(&mut tx)
        .create(&user.user_id, &content, image_url)
        .await;
    let post = match created {
        Ok(post) => post,
        Err(e) => {
            if let Some(image) = &image {
                discard(&*state.s3_client, image).await;
            }
            return Err(e);
        }
    };
    if let Err(e) = tx.commit().await {
        if let Some(image) = &image {
            discard(&*state.s3_client, image).await;
        }
        return Err(e.into());
    }
    tracing::info!("{} published post {}", &user.email, &post.id);
    Ok(back_to_post(&post.id))
}

/// Flips the viewer's like and returns the post as they now see it.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response> {
    let mut tx = state.db_pool.begin_txn().await?;
    let mut post = FeedSelector::new(&mut tx)
        .get(&user.user_id, &post_id)
        .await?
        .ok_or_else(post_not_found)?;
    let liked = PostMutator::new(&mut tx)
        .toggle_like(&post_id, &user.user_id)
        .await?;
    tx.commit().await?;
    post.apply_like(&user.user_id, liked);
    tracing::debug!("{} liked={} post {}", &user.email, liked, &post_id);
    if wants_json(&headers) {
        return Ok(Json(post).into_response());
    }
    Ok(back_to_post(&post_id).into_response())
}

pub async fn comment(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Form(input): Form<CommentInput>,
) -> Result<Response> {
    if input.content.is_empty() {
        return Err(StandardError::new("ERR-POST-002").code(StatusCode::BAD_REQUEST));
    }
    let mut tx = state.db_pool.begin_txn().await?;
    FeedSelector::new(&mut tx)
        .get(&user.user_id, &post_id)
        .await?
        .ok_or_else(post_not_found)?;
    let comment = PostMutator::new(&mut tx)
        .add_comment(&post_id, &user.user_id, &input.content)
        .await?;
    tx.commit().await?;
    tracing::info!("{} commented on post {}", &user.email, &post_id);
    if wants_json(&headers) {
        return Ok(Json(comment).into_response());
    }
    Ok(back_to_post(&post_id).into_response())
}
