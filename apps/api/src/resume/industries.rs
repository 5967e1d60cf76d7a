//! Axum route handlers for the shared industry vocabulary.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::parse_id;
use crate::models::resume::{Industry, IndustryPayload};
use crate::resume::{not_found, require_text};
use crate::state::AppState;

/// GET /industries
pub async fn handle_list_industries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Industry>>, AppError> {
    let industries = sqlx::query_as::<_, Industry>("SELECT * FROM industries ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(industries))
}

/// GET /industries/:id
pub async fn handle_get_industry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Industry>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Industry>("SELECT * FROM industries WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Industry", id))
}

/// POST /industries
pub async fn handle_create_industry(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<IndustryPayload>,
) -> Result<Json<Industry>, AppError> {
    require_text(&payload.title, "title")?;
    let industry =
        sqlx::query_as::<_, Industry>("INSERT INTO industries (title) VALUES ($1) RETURNING *")
            .bind(payload.title.trim())
            .fetch_one(&state.db)
            .await
            .map_err(|e| AppError::unique_violation(e, "title"))?;
    Ok(Json(industry))
}

/// PUT /industries/:id
pub async fn handle_update_industry(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<IndustryPayload>,
) -> Result<Json<Industry>, AppError> {
    let id = parse_id(&id)?;
    require_text(&payload.title, "title")?;
    sqlx::query_as::<_, Industry>("UPDATE industries SET title = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(payload.title.trim())
        .fetch_optional(&state.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "title"))?
        .map(Json)
        .ok_or_else(|| not_found("Industry", id))
}

/// DELETE /industries/:id
pub async fn handle_delete_industry(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM industries WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Industry", id));
    }
    Ok(StatusCode::OK)
}
