use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::portfolio::spec::{
    EducationEntry, ExperienceEntry, NewEducation, NewExperience, NewProject, ProjectEntry, Section,
    SkillEntry,
};
use crate::prelude::Result;

pub struct PortfolioMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> PortfolioMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        PortfolioMutator { pool }
    }

    pub async fn add_experience(&mut self, user_id: &Uuid, e: NewExperience) -> Result<ExperienceEntry> {
        let row = sqlx::query_as::<_, ExperienceEntry>(
            r#"
            INSERT INTO experiences (id, user_id, title, company, location, start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, company, location, start_date, end_date, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&e.title)
        .bind(&e.company)
        .bind(&e.location)
        .bind(e.start_date)
        .bind(e.end_date)
        .bind(&e.description)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn add_education(&mut self, user_id: &Uuid, e: NewEducation) -> Result<EducationEntry> {
        let row = sqlx::query_as::<_, EducationEntry>(
            r#"
            INSERT INTO education (id, user_id, school, degree, field, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, school, degree, field, start_date, end_date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&e.school)
        .bind(&e.degree)
        .bind(&e.field)
        .bind(e.start_date)
        .bind(e.end_date)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Adding a skill the user already lists returns the existing row.
    pub async fn add_skill(&mut self, user_id: &Uuid, name: &str) -> Result<SkillEntry> {
        let row = sqlx::query_as::<_, SkillEntry>(
            r#"
            INSERT INTO skills (id, user_id, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, user_id, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn add_project(&mut self, user_id: &Uuid, p: NewProject) -> Result<ProjectEntry> {
        let row = sqlx::query_as::<_, ProjectEntry>(
            r#"
            INSERT INTO projects (id, user_id, title, description, url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&p.title)
        .bind(&p.description)
        .bind(&p.url)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Deletes an entry only if it belongs to `user_id`.
    pub async fn delete(&mut self, section: Section, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            section.table()
        ))
        .bind(id)
        .bind(user_id)
        .execute(&mut *self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
