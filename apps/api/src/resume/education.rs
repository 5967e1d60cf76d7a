//! Axum route handlers for education entries.

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
use crate::models::resume::{Education, EducationPayload};
use crate::resume::{not_found, require_text};
use crate::state::AppState;

fn validate(payload: &EducationPayload) -> Result<(), AppError> {
    require_text(&payload.school, "school")?;
    require_text(&payload.degree, "degree")?;
    require_text(&payload.field, "field")?;
    if let (Some(start), Some(end)) = (payload.start_year, payload.end_year) {
        if end < start {
            return Err(AppError::UnprocessableEntity(
                "Value for key 'endYear' must not precede 'startYear'.".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn for_users(
    db: &PgPool,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<Education>>, AppError> {
    let rows = sqlx::query_as::<_, Education>(
        "SELECT * FROM education WHERE user_id = ANY($1) ORDER BY id",
    )
    .bind(user_ids)
    .fetch_all(db)
    .await?;
    Ok(group_by(rows, |e| e.user_id))
}

/// GET /education
pub async fn handle_list_education(
    State(state): State<AppState>,
) -> Result<Json<Vec<Education>>, AppError> {
    let rows = sqlx::query_as::<_, Education>("SELECT * FROM education ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// GET /education/:id
pub async fn handle_get_education(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Education>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Education>("SELECT * FROM education WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Education", id))
}

/// POST /education
pub async fn handle_create_education(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<EducationPayload>,
) -> Result<Json<Education>, AppError> {
    validate(&payload)?;
    let row = sqlx::query_as::<_, Education>(
        r#"
        INSERT INTO education
            (user_id, school, degree, field, start_year, end_year, grade,
             activities, accomplishments, media)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(&payload.school)
    .bind(&payload.degree)
    .bind(&payload.field)
    .bind(payload.start_year)
    .bind(payload.end_year)
    .bind(&payload.grade)
    .bind(&payload.activities)
    .bind(&payload.accomplishments)
    .bind(&payload.media)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// PUT /education/:id
pub async fn handle_update_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<EducationPayload>,
) -> Result<Json<Education>, AppError> {
    let id = parse_id(&id)?;
    validate(&payload)?;
    sqlx::query_as::<_, Education>(
        r#"
        UPDATE education
        SET school = $3, degree = $4, field = $5, start_year = $6, end_year = $7,
            grade = $8, activities = $9, accomplishments = $10, media = $11,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(&payload.school)
    .bind(&payload.degree)
    .bind(&payload.field)
    .bind(payload.start_year)
    .bind(payload.end_year)
    .bind(&payload.grade)
    .bind(&payload.activities)
    .bind(&payload.accomplishments)
    .bind(&payload.media)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| not_found("Education", id))
}

/// DELETE /education/:id
pub async fn handle_delete_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM education WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Education", id));
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> EducationPayload {
        EducationPayload {
            school: "ETH Zürich".to_string(),
            degree: "MSc".to_string(),
            field: "Computer Science".to_string(),
            start_year: Some(2015),
            end_year: Some(2017),
            grade: None,
            activities: vec![],
            accomplishments: vec![],
            media: None,
        }
    }

    #[test]
    fn test_valid_entry_passes() {
        assert!(validate(&payload()).is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut p = payload();
        p.end_year = Some(2010);
        assert!(matches!(validate(&p), Err(AppError::UnprocessableEntity(_))));
    }

    #[test]
    fn test_blank_degree_is_rejected() {
        let mut p = payload();
        p.degree = String::new();
        assert!(matches!(validate(&p), Err(AppError::UnprocessableEntity(ref m)) if m.contains("degree")));
    }
}
