use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub school: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize)]
pub struct Portfolio {
    pub experiences: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub projects: Vec<ProjectEntry>,
}

pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

pub struct NewEducation {
    pub school: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// The tables a portfolio entry can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Experiences,
    Education,
    Skills,
    Projects,
}

impl Section {
    pub fn table(&self) -> &'static str {
        match self {
            Section::Experiences => "experiences",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
        }
    }
}

/// A start date after the end date is rejected.
pub fn dates_in_order(start: &NaiveDate, end: Option<&NaiveDate>) -> bool {
    end.is_none_or(|end| start <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_in_order() {
        let start = NaiveDate::from_ymd_opt(2019, 9, 1);
        let end = NaiveDate::from_ymd_opt(2021, 6, 30);
        let (Some(start), Some(end)) = (start, end) else {
            panic!("valid dates");
        };
        assert!(dates_in_order(&start, None));
        assert!(dates_in_order(&start, Some(&end)));
        assert!(dates_in_order(&start, Some(&start)));
        assert!(!dates_in_order(&end, Some(&start)));
    }

    #[test]
    fn test_section_path_names() -> Result<(), serde_json::Error> {
        let s: Section = serde_json::from_str("\"education\"")?;
        assert_eq!(s.table(), "education");
        Ok(())
    }
}
