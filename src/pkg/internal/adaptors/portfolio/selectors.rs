use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::portfolio::spec::{
    EducationEntry, ExperienceEntry, Portfolio, ProjectEntry, SkillEntry,
};
use crate::prelude::Result;

pub struct PortfolioSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> PortfolioSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        PortfolioSelector { pool }
    }

    pub async fn for_user(&mut self, user_id: &Uuid) -> Result<Portfolio> {
        let experiences = sqlx::query_as::<_, ExperienceEntry>(
            "SELECT id, user_id, title, company, location, start_date, end_date, description
             FROM experiences WHERE user_id = $1 ORDER BY start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        let education = sqlx::query_as::<_, EducationEntry>(
            "SELECT id, user_id, school, degree, field, start_date, end_date
             FROM education WHERE user_id = $1 ORDER BY start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        let skills = sqlx::query_as::<_, SkillEntry>(
            "SELECT id, user_id, name FROM skills WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        let projects = sqlx::query_as::<_, ProjectEntry>(
            "SELECT id, user_id, title, description, url, created_at
             FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(Portfolio {
            experiences,
            education,
            skills,
            projects,
        })
    }
}
