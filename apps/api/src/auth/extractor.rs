use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::token::{bearer_token, hash_token};
use crate::errors::AppError;
use crate::state::AppState;

/// Authenticated user resolved from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Ownership is
/// enforced by filtering queries on `user_id`, not here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub token_hash: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let token_hash = hash_token(token);

        let user_id: Option<i64> = sqlx::query_scalar(
            "SELECT user_id FROM tokens WHERE token_hash = $1 AND expires_at > now()",
        )
        .bind(&token_hash)
        .fetch_optional(&state.db)
        .await?;

        user_id
            .map(|user_id| AuthUser {
                user_id,
                token_hash,
            })
            .ok_or(AppError::Unauthorized)
    }
}
