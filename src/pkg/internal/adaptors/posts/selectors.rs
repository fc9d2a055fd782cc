use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::posts::spec::{CommentRow, CommentView, FeedPost, LikeEntry, PostRow};
use crate::prelude::Result;

const POST_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.content, p.image_url, p.created_at,
           a.full_name AS author_full_name, a.title AS author_title, a.avatar_url AS author_avatar_url
    FROM posts p JOIN profiles a ON a.id = p.user_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id, c.content, c.created_at,
           a.full_name AS author_full_name, a.title AS author_title, a.avatar_url AS author_avatar_url
    FROM comments c JOIN profiles a ON a.id = c.user_id
"#;

pub struct FeedSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> FeedSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        FeedSelector { pool }
    }

    /// Newest posts first, each with likes and oldest-first comments.
    pub async fn recent(&mut self, viewer: &Uuid, limit: i64) -> Result<Vec<FeedPost>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{} ORDER BY p.created_at DESC LIMIT $1",
            POST_SELECT
        ))
        .bind(limit)
        .fetch_all(&mut *self.pool)
        .await?;
        self.hydrate(rows, viewer).await
    }

    pub async fn get(&mut self, viewer: &Uuid, post_id: &Uuid) -> Result<Option<FeedPost>> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{} WHERE p.id = $1", POST_SELECT))
            .bind(post_id)
            .fetch_optional(&mut *self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row], viewer).await?.pop()),
            None => Ok(None),
        }
    }

    async fn hydrate(&mut self, rows: Vec<PostRow>, viewer: &Uuid) -> Result<Vec<FeedPost>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let likes = sqlx::query_as::<_, LikeEntry>(
            "SELECT post_id, user_id FROM likes WHERE post_id = ANY($1) ORDER BY created_at",
        )
        .bind(&ids[..])
        .fetch_all(&mut *self.pool)
        .await?;
        let comments = sqlx::query_as::<_, CommentRow>(&format!(
            "{} WHERE c.post_id = ANY($1) ORDER BY c.created_at ASC",
            COMMENT_SELECT
        ))
        .bind(&ids[..])
        .fetch_all(&mut *self.pool)
        .await?;
        tracing::debug!(
            "hydrating {} posts with {} likes and {} comments",
            ids.len(),
            likes.len(),
            comments.len()
        );

        let mut likes_by_post: HashMap<Uuid, Vec<LikeEntry>> = HashMap::new();
        for like in likes {
            likes_by_post.entry(like.post_id).or_default().push(like);
        }
        let mut comments_by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
        for comment in comments {
            comments_by_post
                .entry(comment.post_id)
                .or_default()
                .push(comment.into());
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let likes = likes_by_post.remove(&row.id).unwrap_or_default();
                let comments = comments_by_post.remove(&row.id).unwrap_or_default();
                FeedPost::assemble(row, likes, comments, viewer)
            })
            .collect())
    }
}
