use askama::Template;
use axum::response::Html;
use standard_error::{Interpolate, StandardError};

use crate::{
    pkg::internal::{
        adaptors::{
            connections::spec::PeerConnection,
            jobs::spec::{JobListing, JobStatus, JobType},
            portfolio::spec::Portfolio,
            posts::spec::FeedPost,
            profiles::spec::ProfileEntry,
        },
        network::Relation,
    },
    prelude::Result,
};

pub fn render<T: Template>(template: &T) -> Result<Html<String>> {
    let html = template
        .render()
        .map_err(|e| StandardError::new("ERR-RENDER-001").interpolate_err(e.to_string()))?;
    Ok(Html(html))
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct Login {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct Signup {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct Dashboard {
    pub profile: ProfileEntry,
    pub feed: Vec<FeedPost>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub profile: ProfileEntry,
    pub portfolio: Portfolio,
    pub relation: Relation,
}

impl ProfilePage {
    pub fn own(&self) -> bool {
        matches!(self.relation, Relation::Myself)
    }
}

#[derive(Template)]
#[template(path = "network.html")]
pub struct NetworkPage {
    pub connections: Vec<PeerConnection>,
    pub pending: Vec<PeerConnection>,
    pub suggestions: Vec<ProfileEntry>,
}

#[derive(Template)]
#[template(path = "jobs.html")]
pub struct JobsPage {
    pub jobs: Vec<JobListing>,
    pub mine: Vec<JobListing>,
    pub job_types: [JobType; 5],
}

#[derive(Template)]
#[template(path = "recruiters.html")]
pub struct RecruitersPage {
    pub q: String,
    pub with_resumes: Vec<ProfileEntry>,
    pub others: Vec<ProfileEntry>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::pkg::internal::network::Direction;

    fn profile_page(relation: Relation) -> ProfilePage {
        ProfilePage {
            profile: ProfileEntry {
                id: Uuid::new_v4(),
                email: "lina@example.com".into(),
                full_name: "Lina Bo Bardi".into(),
                title: None,
                location: None,
                bio: None,
                avatar_url: None,
                resume_url: None,
                resume_name: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            portfolio: Portfolio::default(),
            relation,
        }
    }

    #[test]
    fn test_login_shows_error_only_when_present() -> Result<()> {
        let Html(clean) = render(&Login { error: None })?;
        assert!(clean.contains("action=\"/login\""));
        assert!(!clean.contains("role=\"alert\""));
        let Html(failed) = render(&Login {
            error: Some("Invalid email or password".into()),
        })?;
        assert!(failed.contains("Invalid email or password"));
        Ok(())
    }

    #[test]
    fn test_user_text_is_escaped() -> Result<()> {
        let Html(html) = render(&Signup {
            error: Some("<b>bold</b>".into()),
        })?;
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&#60;b&#62;bold"));
        Ok(())
    }

    #[test]
    fn test_jobs_page_lists_every_job_type() -> Result<()> {
        let Html(html) = render(&JobsPage {
            jobs: vec![],
            mine: vec![],
            job_types: JobType::ALL,
        })?;
        for t in JobType::ALL {
            assert!(html.contains(&format!("value=\"{}\"", t.as_str())));
        }
        assert!(html.contains("No open positions yet"));
        Ok(())
    }

    #[test]
    fn test_profile_offers_removal_only_when_allowed() -> Result<()> {
        let page = profile_page(Relation::Accepted {
            direction: Direction::Outgoing,
        });
        let Html(connected) = render(&page)?;
        assert!(connected.contains(&format!("hx-delete=\"/connections/{}\"", page.profile.id)));

        let page = profile_page(Relation::Pending {
            direction: Direction::Incoming,
        });
        let Html(asked) = render(&page)?;
        assert!(asked.contains("/accept"));
        assert!(!asked.contains(&format!("hx-delete=\"/connections/{}\"", page.profile.id)));

        let page = profile_page(Relation::Myself);
        let Html(own) = render(&page)?;
        assert!(!own.contains("/connections/"));
        Ok(())
    }
}
