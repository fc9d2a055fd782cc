use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use serde::Deserialize;
use standard_error::{StandardError, Status};
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::jobs::{
                mutators::JobMutator,
                selectors::JobSelector,
                spec::{JobStatus, JobType, NewJob},
            },
            auth::User,
        },
        server::{
            forms::{empty_as_none, trimmed, validated},
            state::{AppState, GetTxn},
            uispec::{JobsPage, render},
        },
    },
    prelude::Result,
};

const JOBS: &str = "/jobs";

#[derive(Deserialize, Validate)]
pub struct CreateJobInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, message = "title must be at least 3 characters"))]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 2, message = "company must be at least 2 characters"))]
    pub company_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 2, message = "location must be at least 2 characters"))]
    pub location: String,
    pub job_type: JobType,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub salary_range: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 20, message = "description must be at least 20 characters"))]
    pub description: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 20, message = "requirements must be at least 20 characters"))]
    pub requirements: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "invalid contact email"))]
    pub contact_email: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "invalid application url"))]
    pub application_url: Option<String>,
}

impl From<CreateJobInput> for NewJob {
    fn from(input: CreateJobInput) -> Self {
        NewJob {
            title: input.title,
            company_name: input.company_name,
            location: input.location,
            job_type: input.job_type,
            salary_range: input.salary_range,
            description: input.description,
            requirements: input.requirements,
            contact_email: input.contact_email,
            application_url: input.application_url,
        }
    }
}

#[derive(Deserialize)]
pub struct StatusInput {
    pub status: JobStatus,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Html<String>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let mut selector = JobSelector::new(&mut tx);
    let jobs = selector.get_active().await?;
    let mine = selector.get_posted_by(&user.user_id).await?;
    render(&JobsPage {
        jobs,
        mine,
        job_types: JobType::ALL,
    })
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Form(input): Form<CreateJobInput>,
) -> Result<Redirect> {
    let input = validated(input)?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobMutator::new(&mut tx)
        .create(&user.user_id, input.into())
        .await?;
    tx.commit().await?;
    tracing::info!("{} posted job {} ({})", &user.email, &job.title, &job.id);
    Ok(Redirect::to(JOBS))
}

/// Closes or reopens a job; only its poster may.
pub async fn set_status(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(job_id): Path<Uuid>,
    Form(input): Form<StatusInput>,
) -> Result<Redirect> {
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobMutator::new(&mut tx)
        .set_status(&job_id, &user.user_id, input.status)
        .await?
        .ok_or_else(|| StandardError::new("ERR-JOB-001").code(StatusCode::NOT_FOUND))?;
    tx.commit().await?;
    tracing::info!("{} marked job {} {}", &user.email, &job.id, job.status);
    Ok(Redirect::to(JOBS))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "title=Project+Architect&company_name=Snohetta&location=Oslo&job_type=full-time\
        &salary_range=&description=Lead+design+development+for+cultural+projects\
        &requirements=Seven+years+of+practice+and+a+license\
        &contact_email=jobs%40snohetta.example&application_url=";

    #[test]
    fn test_valid_job_form() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let input: CreateJobInput = serde_urlencoded::from_str(VALID)?;
        let input = validated(input).map_err(|_| serde::de::Error::custom("invalid"))?;
        let job: NewJob = input.into();
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.salary_range, None);
        assert_eq!(job.application_url, None);
        Ok(())
    }

    #[test]
    fn test_short_description_is_rejected() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let form = VALID.replace(
            "Lead+design+development+for+cultural+projects",
            "Lead+design",
        );
        let input: CreateJobInput = serde_urlencoded::from_str(&form)?;
        assert!(validated(input).is_err());
        Ok(())
    }

    #[test]
    fn test_bad_contact_and_link_are_rejected() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let form = VALID.replace("jobs%40snohetta.example", "jobs");
        let input: CreateJobInput = serde_urlencoded::from_str(&form)?;
        assert!(validated(input).is_err());
        let form = VALID.replace("application_url=", "application_url=apply-here");
        let input: CreateJobInput = serde_urlencoded::from_str(&form)?;
        assert!(validated(input).is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_job_type_fails_to_parse() {
        let form = VALID.replace("full-time", "gig");
        assert!(serde_urlencoded::from_str::<CreateJobInput>(&form).is_err());
    }
}
