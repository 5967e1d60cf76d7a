//! Axum route handlers for social networking services.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::parse_id;
use crate::models::social::{SocialService, SocialServicePayload};
use crate::resume::{not_found, require_text};
use crate::state::AppState;

/// GET /social/services
pub async fn handle_list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialService>>, AppError> {
    let services =
        sqlx::query_as::<_, SocialService>("SELECT * FROM social_networking_services ORDER BY id")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(services))
}

/// GET /social/services/:id
pub async fn handle_get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SocialService>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, SocialService>("SELECT * FROM social_networking_services WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Social networking service", id))
}

/// POST /social/services
pub async fn handle_create_service(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<SocialServicePayload>,
) -> Result<Json<SocialService>, AppError> {
    require_text(&payload.name, "name")?;
    let service = sqlx::query_as::<_, SocialService>(
        "INSERT INTO social_networking_services (name, type) VALUES ($1, $2) RETURNING *",
    )
    .bind(payload.name.trim())
    .bind(&payload.kind)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::unique_violation(e, "name"))?;
    Ok(Json(service))
}

/// PUT /social/services/:id
pub async fn handle_update_service(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<SocialServicePayload>,
) -> Result<Json<SocialService>, AppError> {
    let id = parse_id(&id)?;
    require_text(&payload.name, "name")?;
    sqlx::query_as::<_, SocialService>(
        "UPDATE social_networking_services SET name = $2, type = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(payload.name.trim())
    .bind(&payload.kind)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| AppError::unique_violation(e, "name"))?
    .map(Json)
    .ok_or_else(|| not_found("Social networking service", id))
}

/// DELETE /social/services/:id
pub async fn handle_delete_service(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM social_networking_services WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Social networking service", id));
    }
    Ok(StatusCode::OK)
}
