use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::profiles::spec::{PROFILE_COLUMNS, ProfileEntry};
use crate::prelude::Result;

/// `ILIKE` pattern matching `q` anywhere, with wildcards in `q` taken literally.
pub fn like_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    for c in q.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}

pub struct ProfileSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProfileSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProfileSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: &Uuid) -> Result<Option<ProfileEntry>> {
        let row = sqlx::query_as::<_, ProfileEntry>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Profiles other than `exclude`, most recently updated first.
    pub async fn others(
        &mut self,
        exclude: &Uuid,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ProfileEntry>> {
        let rows = sqlx::query_as::<_, ProfileEntry>(&format!(
            r#"
            SELECT {} FROM profiles
            WHERE id <> $1
            AND ($2::text IS NULL OR full_name ILIKE $2 OR title ILIKE $2 OR location ILIKE $2)
            ORDER BY updated_at DESC
            LIMIT $3
            "#,
            PROFILE_COLUMNS
        ))
        .bind(exclude)
        .bind(search.map(like_pattern))
        .bind(limit)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    /// Profiles to suggest to `viewer`, skipping `known` peers.
    pub async fn suggestions(
        &mut self,
        viewer: &Uuid,
        known: &[Uuid],
        limit: i64,
    ) -> Result<Vec<ProfileEntry>> {
        let rows = sqlx::query_as::<_, ProfileEntry>(&format!(
            r#"
            SELECT {} FROM profiles
            WHERE id <> $1
            AND NOT (id = ANY($2))
            ORDER BY updated_at DESC
            LIMIT $3
            "#,
            PROFILE_COLUMNS
        ))
        .bind(viewer)
        .bind(known)
        .bind(limit)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn with_resumes(&mut self, search: Option<&str>, limit: i64) -> Result<Vec<ProfileEntry>> {
        let rows = sqlx::query_as::<_, ProfileEntry>(&format!(
            r#"
            SELECT {} FROM profiles
            WHERE resume_url IS NOT NULL
            AND ($1::text IS NULL OR full_name ILIKE $1 OR title ILIKE $1 OR location ILIKE $1)
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
            PROFILE_COLUMNS
        ))
        .bind(search.map(like_pattern))
        .bind(limit)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("lisbon"), "%lisbon%");
        assert_eq!(like_pattern(" 100%_pure\\ "), "%100\\%\\_pure\\\\%");
    }
}
