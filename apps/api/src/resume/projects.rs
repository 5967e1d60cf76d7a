//! Axum route handlers for portfolio projects.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;

use crate::auth::AuthUser;
use crate::db::group_by;
use crate::errors::AppError;
use crate::models::parse_id;
use crate::models::resume::{Project, ProjectPayload};
use crate::resume::{not_found, require_text};
use crate::state::AppState;

fn validate(payload: &ProjectPayload) -> Result<(), AppError> {
    require_text(&payload.name, "name")?;
    if let (Some(start), Some(end)) = (payload.start_date, payload.end_date) {
        if end < start {
            return Err(AppError::UnprocessableEntity(
                "Value for key 'endDate' must not precede 'startDate'.".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn for_users(
    db: &PgPool,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<Project>>, AppError> {
    let rows = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = ANY($1) ORDER BY id",
    )
    .bind(user_ids)
    .fetch_all(db)
    .await?;
    Ok(group_by(rows, |p| p.user_id))
}

/// GET /projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let rows = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// GET /projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Project", id))
}

/// POST /projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProjectPayload>,
) -> Result<Json<Project>, AppError> {
    validate(&payload)?;
    let row = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects
            (user_id, name, note, kind, visibility, summary, artwork_url,
             screenshot_urls, track_view_url, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(&payload.name)
    .bind(&payload.note)
    .bind(payload.kind.as_str())
    .bind(payload.visibility.as_str())
    .bind(&payload.summary)
    .bind(&payload.artwork_url)
    .bind(&payload.screenshot_urls)
    .bind(&payload.track_view_url)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// PUT /projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<ProjectPayload>,
) -> Result<Json<Project>, AppError> {
    let id = parse_id(&id)?;
    validate(&payload)?;
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET name = $3, note = $4, kind = $5, visibility = $6, summary = $7,
            artwork_url = $8, screenshot_urls = $9, track_view_url = $10,
            start_date = $11, end_date = $12, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(&payload.name)
    .bind(&payload.note)
    .bind(payload.kind.as_str())
    .bind(payload.visibility.as_str())
    .bind(&payload.summary)
    .bind(&payload.artwork_url)
    .bind(&payload.screenshot_urls)
    .bind(&payload.track_view_url)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| not_found("Project", id))
}

/// DELETE /projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Project", id));
    }
    Ok(StatusCode::OK)
}
