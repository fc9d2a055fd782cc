use crate::{
    conf::settings,
    pkg::{
        internal::adaptors::profiles::mutators::ProfileMutator,
        server::state::{AppState, GetTxn},
    },
    prelude::Result,
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sqlx::{
    PgConnection,
    prelude::{FromRow, Type},
};
use standard_error::{Interpolate, StandardError, Status};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "_Host_session";

#[derive(Debug, Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Revoked,
}

#[derive(FromRow, Debug)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub expiry: DateTime<Utc>,
    pub status: SessionStatus,
}

#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(FromRow)]
struct StoredCredentials {
    user_id: Uuid,
    email: String,
    password_hash: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl User {
    /// Creates the account and its profile row in one transaction.
    pub async fn register(
        state: &AppState,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Self> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;
        let mut tx = state.db_pool.begin_txn().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING user_id, email
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&password_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StandardError::new("ERR-AUTH-004").code(StatusCode::CONFLICT))?;
        ProfileMutator::new(&mut tx)
            .create(&user.user_id, &user.email, full_name.trim())
            .await?;
        tx.commit().await?;
        tracing::info!("registered {}", &user.email);
        Ok(user)
    }

    /// Password sign in; both unknown email and wrong password yield the same error.
    pub async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<(Self, Session)> {
        let email = normalize_email(email);
        let mut tx = state.db_pool.begin_txn().await?;
        let stored = sqlx::query_as::<_, StoredCredentials>(
            "SELECT user_id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(stored) = stored else {
            tracing::warn!("sign in for unknown email");
            return Err(StandardError::new("ERR-AUTH-003").code(StatusCode::UNAUTHORIZED));
        };
        if !verify_password(password, &stored.password_hash)? {
            tracing::warn!("wrong password for {}", &stored.email);
            return Err(StandardError::new("ERR-AUTH-003").code(StatusCode::UNAUTHORIZED));
        }
        let user = User {
            user_id: stored.user_id,
            email: stored.email,
        };
        let session = user.start_session(&mut tx).await?;
        tx.commit().await?;
        tracing::info!("{} signed in", &user.email);
        Ok((user, session))
    }

    pub async fn start_session(&self, conn: &mut PgConnection) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expiry, status)
            VALUES ($1, $2, NOW() + make_interval(hours => $3), $4)
            RETURNING token, user_id, expiry, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(self.user_id)
        .bind(settings.session_ttl_hours)
        .bind(SessionStatus::Active)
        .fetch_one(conn)
        .await?;
        Ok(session)
    }
}

impl Session {
    /// Slides the expiry of a live session forward and returns its owner.
    pub async fn refresh(state: &AppState, token_str: &str) -> Result<User> {
        let token = token_str
            .parse::<Uuid>()
            .map_err(|_| StandardError::new("ERR-AUTH-002").code(StatusCode::UNAUTHORIZED))?;
        tracing::debug!("refreshing session {}", token);
        let user = sqlx::query_as::<_, User>(
            r#"
            WITH refreshed AS (
                UPDATE sessions
                SET expiry = NOW() + make_interval(hours => $2)
                WHERE token = $1 AND status = $3 AND expiry > NOW()
                RETURNING user_id
            )
            SELECT u.user_id, u.email FROM users u
            JOIN refreshed r ON r.user_id = u.user_id
            "#,
        )
        .bind(token)
        .bind(settings.session_ttl_hours)
        .bind(SessionStatus::Active)
        .fetch_optional(&*state.db_pool)
        .await?;
        user.ok_or_else(|| StandardError::new("ERR-AUTH-001").code(StatusCode::UNAUTHORIZED))
    }

    pub async fn revoke(state: &AppState, token_str: &str) -> Result<()> {
        let Ok(token) = token_str.parse::<Uuid>() else {
            return Ok(());
        };
        sqlx::query("UPDATE sessions SET status = $2 WHERE token = $1 AND status = $3")
            .bind(token)
            .bind(SessionStatus::Revoked)
            .bind(SessionStatus::Active)
            .execute(&*state.db_pool)
            .await?;
        Ok(())
    }
}
