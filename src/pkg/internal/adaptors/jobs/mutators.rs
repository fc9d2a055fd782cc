use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::{JOB_COLUMNS, JobEntry, JobStatus, NewJob};
use crate::prelude::Result;

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    pub async fn create(&mut self, posted_by: &Uuid, job: NewJob) -> Result<JobEntry> {
        let row = sqlx::query_as::<_, JobEntry>(&format!(
            r#"
            INSERT INTO jobs (id, title, company_name, location, job_type, salary_range, description,
                              requirements, contact_email, application_url, posted_by, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.location)
        .bind(job.job_type)
        .bind(&job.salary_range)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.contact_email)
        .bind(&job.application_url)
        .bind(posted_by)
        .bind(JobStatus::Active)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Only the poster can change a job's status; anyone else gets `None`.
    pub async fn set_status(&mut self, id: &Uuid, posted_by: &Uuid, status: JobStatus) -> Result<Option<JobEntry>> {
        let row = sqlx::query_as::<_, JobEntry>(&format!(
            r#"
            UPDATE jobs SET status = $3, updated_at = NOW()
            WHERE id = $1 AND posted_by = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(posted_by)
        .bind(status)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
