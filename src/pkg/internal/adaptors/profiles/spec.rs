use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileEntry {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub resume_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a profile shown next to posts, comments, jobs and connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub full_name: String,
    pub title: Option<String>,
    pub avatar_url: Option<String>,
}

impl AuthorSummary {
    pub fn initials(&self) -> String {
        initials(&self.full_name)
    }
}

impl ProfileEntry {
    pub fn initials(&self) -> String {
        initials(&self.full_name)
    }
}

pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

pub struct ProfileDetails {
    pub full_name: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

pub const PROFILE_COLUMNS: &str = "id, email, full_name, title, location, bio, avatar_url, resume_url, resume_name, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("zaha hadid"), "ZH");
        assert_eq!(initials("  Le   Corbusier "), "LC");
        assert_eq!(initials(""), "");
    }
}
