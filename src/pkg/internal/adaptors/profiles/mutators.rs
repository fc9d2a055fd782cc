use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::profiles::spec::{PROFILE_COLUMNS, ProfileDetails, ProfileEntry};
use crate::prelude::Result;

pub struct ProfileMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProfileMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProfileMutator { pool }
    }

    pub async fn create(&mut self, id: &Uuid, email: &str, full_name: &str) -> Result<ProfileEntry> {
        let row = sqlx::query_as::<_, ProfileEntry>(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(email)
        .bind(full_name)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_details(&mut self, id: &Uuid, details: &ProfileDetails) -> Result<Option<ProfileEntry>> {
        let row = sqlx::query_as::<_, ProfileEntry>(&format!(
            r#"
            UPDATE profiles
            SET full_name = $2, title = $3, location = $4, bio = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(&details.full_name)
        .bind(&details.title)
        .bind(&details.location)
        .bind(&details.bio)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_avatar(&mut self, id: &Uuid, avatar_url: Option<&str>) -> Result<Option<ProfileEntry>> {
        let row = sqlx::query_as::<_, ProfileEntry>(&format!(
            "UPDATE profiles SET avatar_url = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(avatar_url)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_resume(
        &mut self,
        id: &Uuid,
        resume_url: Option<&str>,
        resume_name: Option<&str>,
    ) -> Result<Option<ProfileEntry>> {
        let row = sqlx::query_as::<_, ProfileEntry>(&format!(
            r#"
            UPDATE profiles
            SET resume_url = $2, resume_name = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(resume_url)
        .bind(resume_name)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
