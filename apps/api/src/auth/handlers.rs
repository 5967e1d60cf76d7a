//! Axum route handlers for login and logout.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::verify_password_blocking;
use crate::auth::token::{generate_token, hash_token};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

fn token_expiry(now: DateTime<Utc>, ttl_hours: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Token lifetime of {ttl_hours} hours is out of range"
            ))
        })
}

/// POST /login
///
/// Unknown usernames and wrong passwords are indistinguishable.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(req.username.trim())
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password_blocking(req.password, user.password_hash.clone()).await {
        return Err(AppError::Unauthorized);
    }

    let token = generate_token();
    let expires_at = token_expiry(Utc::now(), state.config.token_ttl_hours)?;
    sqlx::query("INSERT INTO tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user.id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .execute(&state.db)
        .await?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        expires_at,
    }))
}

/// POST /logout
pub async fn handle_logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    sqlx::query("DELETE FROM tokens WHERE token_hash = $1")
        .bind(&user.token_hash)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::OK)
}
