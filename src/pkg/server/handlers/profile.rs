use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use standard_error::{StandardError, Status};
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                portfolio::{
                    mutators::PortfolioMutator,
                    selectors::PortfolioSelector,
                    spec::{NewEducation, NewExperience, NewProject, Section, dates_in_order},
                },
                profiles::{
                    mutators::ProfileMutator,
                    selectors::ProfileSelector,
                    spec::{ProfileDetails, ProfileEntry},
                },
            },
            auth::User,
            gate::DASHBOARD,
            network::Relation,
            storage::{S3Ops, StoredObject, discard, key_from_url, store},
            uploads::{AVATAR, RESUME, Upload, UploadPolicy},
        },
        server::{
            forms::{MultipartForm, empty_as_none, trimmed, validated},
            state::{AppState, GetTxn},
            uispec::{ProfilePage, render},
        },
    },
    prelude::Result,
};

const PROFILE: &str = "/profile";

#[derive(Deserialize)]
pub struct ProfileQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct ProfileInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub full_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub bio: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct ExperienceInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "role is required"))]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "company is required"))]
    pub company: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct EducationInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "school is required"))]
    pub school: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub field: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, Validate)]
pub struct SkillInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 50, message = "skill must be 1 to 50 characters"))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct ProjectInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "project title is required"))]
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "invalid project link"))]
    pub url: Option<String>,
}

fn dates_out_of_order() -> StandardError {
    StandardError::new("ERR-PROFILE-002").code(StatusCode::UNPROCESSABLE_ENTITY)
}

fn profile_not_found() -> StandardError {
    StandardError::new("ERR-PROFILE-001").code(StatusCode::NOT_FOUND)
}

fn refreshed() -> Response {
    [("HX-Refresh", "true")].into_response()
}

pub async fn view(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let id = query.id.unwrap_or(user.user_id);
    let mut tx = state.db_pool.begin_txn().await?;
    let Some(profile) = ProfileSelector::new(&mut tx).get_by_id(&id).await? else {
        tracing::debug!("profile {} not found, sending {} home", &id, &user.email);
        return Ok(Redirect::to(DASHBOARD).into_response());
    };
    let portfolio = PortfolioSelector::new(&mut tx).for_user(&id).await?;
    let relation = Relation::lookup(&mut tx, &user.user_id, &id).await?;
    Ok(render(&ProfilePage {
        profile,
        portfolio,
        relation,
    })?
    .into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Form(input): Form<ProfileInput>,
) -> Result<Redirect> {
    let input = validated(input)?;
    let details = ProfileDetails {
        full_name: input.full_name,
        title: input.title,
        location: input.location,
        bio: input.bio,
    };
    let mut tx = state.db_pool.begin_txn().await?;
    ProfileMutator::new(&mut tx)
        .update_details(&user.user_id, &details)
        .await?
        .ok_or_else(profile_not_found)?;
    tx.commit().await?;
    tracing::info!("{} updated their profile", &user.email);
    Ok(Redirect::to(PROFILE))
}

fn required_file(form: MultipartForm) -> Result<Upload> {
    form.file.ok_or_else(|| {
        StandardError::new("ERR-UPLOAD-004").code(StatusCode::BAD_REQUEST)
    })
}

/// Deletes a previous object, but only one this user's uploads produced.
async fn drop_previous(
    s3: &(dyn S3Ops + Send + Sync),
    policy: &UploadPolicy,
    user: &Uuid,
    previous: Option<&str>,
) {
    let bucket = policy.bucket.as_str();
    let Some(key) = previous.and_then(|url| key_from_url(bucket, url)) else {
        return;
    };
    if !policy.owns_key(user, &key) {
        tracing::debug!("leaving foreign object {}/{} in place", bucket, &key);
        return;
    }
    if s3.remove_object(bucket, &key).await.is_err() {
        tracing::error!("could not remove previous object {}/{}", bucket, &key);
    }
}

/// Writes the new file then points the profile at it, undoing the upload if the row write fails.
async fn replace_file(
    state: &AppState,
    user: &User,
    policy: &UploadPolicy,
    upload: Upload,
) -> Result<(ProfileEntry, ProfileEntry)> {
    let file_name = upload.file_name.clone();
    let object = store(&*state.s3_client, policy, &user.user_id, upload).await?;
    match point_profile_at(state, user, policy, &object, &file_name).await {
        Ok(change) => Ok(change),
        Err(e) => {
            discard(&*state.s3_client, &object).await;
            Err(e)
        }
    }
}

async fn point_profile_at(
    state: &AppState,
    user: &User,
    policy: &UploadPolicy,
    object: &StoredObject,
    file_name: &str,
) -> Result<(ProfileEntry, ProfileEntry)> {
    let mut tx = state.db_pool.begin_txn().await?;
    let before = ProfileSelector::new(&mut tx)
        .get_by_id(&user.user_id)
        .await?
        .ok_or_else(profile_not_found)?;
    let mut mutator = ProfileMutator::new(&mut tx);
    let updated = if policy.bucket == AVATAR.bucket {
        mutator.set_avatar(&user.user_id, Some(&object.url)).await?
    } else {
        mutator
            .set_resume(&user.user_id, Some(&object.url), Some(file_name))
            .await?
    };
    let after = updated.ok_or_else(profile_not_found)?;
    tx.commit().await?;
    Ok((before, after))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    multipart: Multipart,
) -> Result<Redirect> {
    let upload = required_file(MultipartForm::read(multipart, "file").await?)?;
    let (before, after) = replace_file(&state, &user, &AVATAR, upload).await?;
    drop_previous(
        &*state.s3_client,
        &AVATAR,
        &user.user_id,
        before.avatar_url.as_deref(),
    )
    .await;
    tracing::info!(
        "{} changed avatar to {}",
        &user.email,
        after.avatar_url.as_deref().unwrap_or_default()
    );
    Ok(Redirect::to(PROFILE))
}

pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    multipart: Multipart,
) -> Result<Redirect> {
    let upload = required_file(MultipartForm::read(multipart, "file").await?)?;
    let (before, after) = replace_file(&state, &user, &RESUME, upload).await?;
    drop_previous(
        &*state.s3_client,
        &RESUME,
        &user.user_id,
        before.resume_url.as_deref(),
    )
    .await;
    tracing::info!(
        "{} uploaded resume {}",
        &user.email,
        after.resume_name.as_deref().unwrap_or_default()
    );
    Ok(Redirect::to(PROFILE))
}

pub async fn remove_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Response> {
    let mut tx = state.db_pool.begin_txn().await?;
    let profile = ProfileSelector::new(&mut tx)
        .get_by_id(&user.user_id)
        .await?
        .ok_or_else(profile_not_found)?;
    drop_previous(
        &*state.s3_client,
        &AVATAR,
        &user.user_id,
        profile.avatar_url.as_deref(),
    )
    .await;
    ProfileMutator::new(&mut tx)
        .set_avatar(&user.user_id, None)
        .await?;
    tx.commit().await?;
    tracing::info!("{} removed their avatar", &user.email);
    Ok(refreshed())
}

pub async fn remove_resume(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Response> {
    let mut tx = state.db_pool.begin_txn().await?;
    let profile = ProfileSelector::new(&mut tx)
        .get_by_id(&user.user_id)
        .await?
        .ok_or_else(profile_not_found)?;
    drop_previous(
        &*state.s3_client,
        &RESUME,
        &user.user_id,
        profile.resume_url.as_deref(),
    )
    .await;
    ProfileMutator::new(&mut tx)
        .set_resume(&user.user_id, None, None)
        .await?;
    tx.commit().await?;
    tracing::info!("{} removed their resume", &user.email);
    Ok(refreshed())
}

pub async fn add_experience(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Form(input): Form<ExperienceInput>,
) -> Result<Redirect> {
    let input = validated(input)?;
    if !dates_in_order(&input.start_date, input.end_date.as_ref()) {
        return Err(dates_out_of_order());
    }
    let mut tx = state.db_pool.begin_txn().await?;
    PortfolioMutator::new(&mut tx)
        .add_experience(
            &user.user_id,
            NewExperience {
                title: input.title,
                company: input.company,
                location: input.location,
                start_date: input.start_date,
                end_date: input.end_date,
                description: input.description,
            },
        )
        .await?;
    tx.commit().await?;
    Ok(Redirect::to(PROFILE))
}

pub async fn add_education(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Form(input): Form<EducationInput>,
) -> Result<Redirect> {
    let input = validated(input)?;
    if !dates_in_order(&input.start_date, input.end_date.as_ref()) {
        return Err(dates_out_of_order());
    }
    let mut tx = state.db_pool.begin_txn().await?;
    PortfolioMutator::new(&mut tx)
        .add_education(
            &user.user_id,
            NewEducation {
                school: input.school,
                degree: input.degree,
                field: input.field,
                start_date: input.start_date,
                end_date: input.end_date,
            },
        )
        .await?;
    tx.commit().await?;
    Ok(Redirect::to(PROFILE))
}

pub async fn add_skill(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Form(input): Form<SkillInput>,
) -> Result<Redirect> {
    let input = validated(input)?;
    let mut tx = state.db_pool.begin_txn().await?;
    PortfolioMutator::new(&mut tx)
        .add_skill(&user.user_id, &input.name)
        .await?;
    tx.commit().await?;
    Ok(Redirect::to(PROFILE))
}

pub async fn add_project(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Form(input): Form<ProjectInput>,
) -> Result<Redirect> {
    let input = validated(input)?;
    let mut tx = state.db_pool.begin_txn().await?;
    PortfolioMutator::new(&mut tx)
        .add_project(
            &user.user_id,
            NewProject {
                title: input.title,
                description: input.description,
                url: input.url,
            },
        )
        .await?;
    tx.commit().await?;
    Ok(Redirect::to(PROFILE))
}

/// Removes one of the viewer's own portfolio entries; answers with an empty body for htmx to swap.
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path((section, id)): Path<(Section, Uuid)>,
) -> Result<Html<String>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let deleted = PortfolioMutator::new(&mut tx)
        .delete(section, &id, &user.user_id)
        .await?;
    if !deleted {
        return Err(StandardError::new("ERR-PROFILE-003").code(StatusCode::NOT_FOUND));
    }
    tx.commit().await?;
    tracing::debug!("{} deleted {} entry {}", &user.email, section.table(), &id);
    Ok(Html(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_form_blanks_become_null() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let input: ProfileInput =
            serde_urlencoded::from_str("full_name=+Tadao+Ando+&title=&location=Osaka&bio=")?;
        assert_eq!(input.full_name, "Tadao Ando");
        assert_eq!(input.title, None);
        assert_eq!(input.location.as_deref(), Some("Osaka"));
        assert_eq!(input.bio, None);
        Ok(())
    }

    #[test]
    fn test_short_names_are_rejected() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let input: ProfileInput = serde_urlencoded::from_str("full_name=T")?;
        assert!(validated(input).is_err());
        Ok(())
    }

    #[test]
    fn test_experience_end_date_is_optional() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let input: ExperienceInput = serde_urlencoded::from_str(
            "title=Partner&company=OMA&location=&start_date=2015-03-01&end_date=&description=",
        )?;
        assert_eq!(input.end_date, None);
        assert!(dates_in_order(&input.start_date, input.end_date.as_ref()));
        Ok(())
    }

    #[test]
    fn test_project_link_must_be_a_url() -> core::result::Result<(), serde_urlencoded::de::Error> {
        let bad: ProjectInput = serde_urlencoded::from_str("title=Pavilion&url=not+a+link")?;
        assert!(validated(bad).is_err());
        let blank: ProjectInput = serde_urlencoded::from_str("title=Pavilion&url=")?;
        assert!(validated(blank).is_ok());
        Ok(())
    }
}
