use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::posts::spec::{CommentRow, CommentView, PostEntry};
use crate::prelude::Result;

pub struct PostMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> PostMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        PostMutator { pool }
    }

    pub async fn create(&mut self, user_id: &Uuid, content: &str, image_url: Option<&str>) -> Result<PostEntry> {
        let row = sqlx::query_as::<_, PostEntry>(
            r#"
            INSERT INTO posts (id, user_id, content, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, content, image_url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .bind(image_url)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn like(&mut self, post_id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO likes (id, post_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn unlike(&mut self, post_id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes the like if present, otherwise adds it. Returns whether the post is now liked.
    pub async fn toggle_like(&mut self, post_id: &Uuid, user_id: &Uuid) -> Result<bool> {
        if self.unlike(post_id, user_id).await? {
            return Ok(false);
        }
        self.like(post_id, user_id).await?;
        Ok(true)
    }

    pub async fn add_comment(&mut self, post_id: &Uuid, user_id: &Uuid, content: &str) -> Result<CommentView> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH c AS (
                INSERT INTO comments (id, post_id, user_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, post_id, user_id, content, created_at
            )
            SELECT c.id, c.post_id, c.user_id, c.content, c.created_at,
                   a.full_name AS author_full_name, a.title AS author_title, a.avatar_url AS author_avatar_url
            FROM c JOIN profiles a ON a.id = c.user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row.into())
    }
}
