use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use standard_error::StandardError;

use crate::{
    conf::settings,
    pkg::{
        internal::{
            auth::{SESSION_COOKIE, Session},
            gate::{DASHBOARD, Gate, LOGIN, gate},
        },
        server::state::AppState,
    },
    prelude::Result,
};

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(settings.base_url.starts_with("https://"))
        .same_site(SameSite::Lax)
        .build()
}

pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().is_ok_and(|v| v.starts_with(&prefix)))
}

/// Expired, revoked or malformed tokens, which leave the visitor anonymous.
fn is_dead_session(e: &StandardError) -> bool {
    matches!(e.err_code.as_str(), "ERR-AUTH-001" | "ERR-AUTH-002")
}

/// Resolves the session cookie on every request, slides its expiry, and
/// applies the route gating rules before the handler runs.
pub async fn refresh_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let user = match &token {
        Some(token) => match Session::refresh(&state, token).await {
            Ok(user) => Some(user),
            Err(e) if is_dead_session(&e) => {
                tracing::warn!("session rejected, treating request as anonymous");
                None
            }
            Err(e) => {
                tracing::error!("could not resolve session: {}", &e.message);
                return Err(e);
            }
        },
        None => None,
    };

    let path = request.uri().path().to_string();
    match gate(&path, user.is_some()) {
        Gate::ToLogin => {
            tracing::debug!("{} requires a session, redirecting to {}", &path, LOGIN);
            let jar = match token {
                Some(_) => jar.remove(cleared_session_cookie()),
                None => jar,
            };
            return Ok((jar, Redirect::to(LOGIN)).into_response());
        }
        Gate::ToDashboard => {
            return Ok(Redirect::to(DASHBOARD).into_response());
        }
        Gate::Pass => {}
    }

    match (user, token) {
        (Some(user), Some(token)) => {
            request.extensions_mut().insert(Arc::new(user));
            let response = next.run(request).await;
            if sets_session_cookie(&response) {
                return Ok(response);
            }
            Ok((CookieJar::new().add(session_cookie(token)), response).into_response())
        }
        _ => Ok(next.run(request).await),
    }
}
