use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};

use super::handlers::{
    auth, jobs, network, posts,
    probes::{healthz, livez},
    profile, recruiters,
    ui::{dashboard, home},
};
use super::middlewares::session;
use super::state::AppState;
use crate::{conf::settings, prelude::Result};

pub async fn build_routes() -> Result<Router> {
    Ok(routes(AppState::new().await?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard))
        .route("/feed", get(posts::feed))
        .route("/posts", post(posts::create))
        .route("/posts/:id/like", post(posts::toggle_like))
        .route("/posts/:id/comments", post(posts::comment))
        .route("/profile", get(profile::view).post(profile::edit))
        .route(
            "/profile/avatar",
            post(profile::upload_avatar).delete(profile::remove_avatar),
        )
        .route(
            "/profile/resume",
            post(profile::upload_resume).delete(profile::remove_resume),
        )
        .route("/profile/experiences", post(profile::add_experience))
        .route("/profile/education", post(profile::add_education))
        .route("/profile/skills", post(profile::add_skill))
        .route("/profile/projects", post(profile::add_project))
        .route("/profile/:section/:id", delete(profile::delete_entry))
        .route("/network", get(network::page))
        .route(
            "/connections/:profile_id",
            get(network::status)
                .post(network::request)
                .delete(network::remove),
        )
        .route("/connections/:profile_id/accept", post(network::accept))
        .route("/connections/:profile_id/reject", post(network::reject))
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/:id/status", post(jobs::set_status))
        .route("/recruiters", get(recruiters::page))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), session::refresh_session))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::Body,
        http::{
            Request, StatusCode,
            header::{COOKIE, LOCATION, SET_COOKIE},
        },
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tracing_test::traced_test;
    use uuid::Uuid;

    use super::*;
    use crate::pkg::internal::storage::s3_client;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_livez_is_public() -> Result<()> {
        let response = build_routes().await?.oneshot(get_request("/livez")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_protected_pages_redirect_to_login() -> Result<()> {
        for uri in ["/", "/dashboard", "/profile", "/network", "/jobs", "/recruiters", "/feed"] {
            let response = build_routes().await?.oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(
                response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
                Some("/login"),
                "{}",
                uri
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_writes_are_redirected_before_handlers_run() -> Result<()> {
        let request = Request::builder()
            .method("POST")
            .uri("/posts/00000000-0000-0000-0000-000000000000/like")
            .body(Body::empty())
            .unwrap();
        let response = build_routes().await?.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_page_renders_without_session() -> Result<()> {
        let response = build_routes().await?.oneshot(get_request("/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("action=\"/login\""));
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_malformed_session_cookie_is_treated_as_anonymous() -> Result<()> {
        let request = Request::builder()
            .uri("/dashboard")
            .header(COOKIE, "_Host_session=not-a-token")
            .body(Body::empty())
            .unwrap();
        let response = build_routes().await?.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/login")
        );
        assert!(logs_contain("session rejected"));
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_database_outage_keeps_the_session_cookie() -> Result<()> {
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(300))
            .connect_lazy("postgres://u:p@127.0.0.1:1/unreachable")?;
        let state = AppState {
            db_pool: Arc::new(db_pool),
            s3_client: Arc::new(s3_client()),
        };
        let request = Request::builder()
            .uri("/dashboard")
            .header(COOKIE, format!("_Host_session={}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let response = routes(state).oneshot(request).await.unwrap();
        assert!(response.status().is_server_error());
        assert!(response.headers().get(LOCATION).is_none());
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert!(logs_contain("could not resolve session"));
        assert!(!logs_contain("session rejected"));
        Ok(())
    }
}
