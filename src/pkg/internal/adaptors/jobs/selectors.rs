use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::{JobListing, JobRow, JobStatus};
use crate::prelude::Result;

const LISTING_SELECT: &str = r#"
    SELECT j.id, j.title, j.company_name, j.location, j.job_type, j.salary_range, j.description,
           j.requirements, j.contact_email, j.application_url, j.posted_by, j.status,
           j.created_at, j.updated_at,
           p.full_name AS poster_full_name, p.title AS poster_title, p.avatar_url AS poster_avatar_url
    FROM jobs j JOIN profiles p ON p.id = j.posted_by
"#;

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn get_active(&mut self) -> Result<Vec<JobListing>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{} WHERE j.status = $1 ORDER BY j.created_at DESC",
            LISTING_SELECT
        ))
        .bind(JobStatus::Active)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows.into_iter().map(JobListing::from).collect())
    }

    pub async fn get_posted_by(&mut self, user_id: &Uuid) -> Result<Vec<JobListing>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{} WHERE j.posted_by = $1 ORDER BY j.created_at DESC",
            LISTING_SELECT
        ))
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows.into_iter().map(JobListing::from).collect())
    }
}
