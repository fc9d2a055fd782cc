use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use standard_error::HtmlRes;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            auth::{SESSION_COOKIE, Session, User},
            gate::{DASHBOARD, LOGIN},
        },
        server::{
            forms::{trimmed, validated},
            middlewares::session::{cleared_session_cookie, session_cookie},
            state::AppState,
            uispec::{Login, Signup, render},
        },
    },
    prelude::Result,
};

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignupInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub full_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

fn login_with(error: &str) -> Result<String> {
    let Html(html) = render(&Login {
        error: Some(error.into()),
    })?;
    Ok(html)
}

fn signup_with(error: &str) -> Result<String> {
    let Html(html) = render(&Signup {
        error: Some(error.into()),
    })?;
    Ok(html)
}

pub async fn login_page() -> Result<Html<String>> {
    render(&Login { error: None })
}

pub async fn signup_page() -> Result<Html<String>> {
    render(&Signup { error: None })
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Result<(CookieJar, Redirect)> {
    let (user, session) = match User::sign_in(&state, &input.email, &input.password).await {
        Ok(signed_in) => signed_in,
        Err(mut e) => return Err(e.template(login_with("Invalid email or password")?)),
    };
    tracing::debug!("session {} issued for {}", &session.token, &user.user_id);
    Ok((
        jar.add(session_cookie(session.token.to_string())),
        Redirect::to(DASHBOARD),
    ))
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SignupInput>,
) -> Result<(CookieJar, Redirect)> {
    let input = match validated(input) {
        Ok(input) => input,
        Err(mut e) => {
            return Err(e.template(signup_with(
                "Enter your name, a valid email and a password of at least 8 characters",
            )?));
        }
    };
    let user = match User::register(&state, &input.email, &input.password, &input.full_name).await
    {
        Ok(user) => user,
        Err(mut e) => {
            return Err(e.template(signup_with(
                "Could not create an account with this email, try signing in",
            )?));
        }
    };
    let mut conn = state.db_pool.acquire().await?;
    let session = user.start_session(&mut conn).await?;
    Ok((
        jar.add(session_cookie(session.token.to_string())),
        Redirect::to(DASHBOARD),
    ))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Redirect)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Session::revoke(&state, cookie.value()).await?;
        tracing::info!("session signed out");
    }
    Ok((jar.remove(cleared_session_cookie()), Redirect::to(LOGIN)))
}
