use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::pkg::internal::adaptors::profiles::spec::AuthorSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "job_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Freelance,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Freelance => "freelance",
            JobType::Internship => "internship",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Active => write!(f, "active"),
            JobStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobEntry {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_range: Option<String>,
    pub description: String,
    pub requirements: String,
    pub contact_email: String,
    pub application_url: Option<String>,
    pub posted_by: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job row joined with the poster's profile.
#[derive(FromRow)]
pub struct JobRow {
    #[sqlx(flatten)]
    pub job: JobEntry,
    pub poster_full_name: String,
    pub poster_title: Option<String>,
    pub poster_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    #[serde(flatten)]
    pub job: JobEntry,
    pub poster: AuthorSummary,
}

impl From<JobRow> for JobListing {
    fn from(row: JobRow) -> Self {
        JobListing {
            poster: AuthorSummary {
                id: row.job.posted_by,
                full_name: row.poster_full_name,
                title: row.poster_title,
                avatar_url: row.poster_avatar_url,
            },
            job: row.job,
        }
    }
}

pub struct NewJob {
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_range: Option<String>,
    pub description: String,
    pub requirements: String,
    pub contact_email: String,
    pub application_url: Option<String>,
}

pub const JOB_COLUMNS: &str = "id, title, company_name, location, job_type, salary_range, description, requirements, contact_email, application_url, posted_by, status, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_wire_names() -> Result<(), serde_json::Error> {
        for t in JobType::ALL {
            let json = serde_json::to_string(&t)?;
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
        let parsed: JobType = serde_json::from_str("\"part-time\"")?;
        assert_eq!(parsed, JobType::PartTime);
        assert_eq!(JobType::FullTime.label(), "full time");
        Ok(())
    }
}
