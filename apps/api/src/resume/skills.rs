//! Axum route handlers for skill sets.

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
use crate::models::resume::{Skill, SkillPayload};
use crate::resume::not_found;
use crate::state::AppState;

/// Drops blank entries and surrounding whitespace.
fn clean(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn for_users(
    db: &PgPool,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<Skill>>, AppError> {
    let rows = sqlx::query_as::<_, Skill>(
        "SELECT * FROM skills WHERE user_id = ANY($1) ORDER BY id",
    )
    .bind(user_ids)
    .fetch_all(db)
    .await?;
    Ok(group_by(rows, |s| s.user_id))
}

/// GET /skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<Skill>>, AppError> {
    let rows = sqlx::query_as::<_, Skill>("SELECT * FROM skills ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// GET /skills/:id
pub async fn handle_get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Skill>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Skill", id))
}

/// POST /skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SkillPayload>,
) -> Result<Json<Skill>, AppError> {
    let row = sqlx::query_as::<_, Skill>(
        "INSERT INTO skills (user_id, professional, workflow) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.user_id)
    .bind(clean(&payload.professional))
    .bind(clean(&payload.workflow))
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// PUT /skills/:id
pub async fn handle_update_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<SkillPayload>,
) -> Result<Json<Skill>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Skill>(
        r#"
        UPDATE skills
        SET professional = $3, workflow = $4, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(clean(&payload.professional))
    .bind(clean(&payload.workflow))
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| not_found("Skill", id))
}

/// DELETE /skills/:id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM skills WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Skill", id));
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_blank_entries() {
        let items = vec![" Rust ".to_string(), "".to_string(), "  ".to_string(), "SQL".to_string()];
        assert_eq!(clean(&items), vec!["Rust", "SQL"]);
    }
}
