//! Axum route handlers for blog categories.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::blog::{Category, CategoryPayload};
use crate::models::parse_id;
use crate::state::AppState;

fn validate(payload: &CategoryPayload) -> Result<String, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Value required for key 'name'.".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// GET /categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(categories))
}

/// GET /categories/:id
pub async fn handle_get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}

/// POST /categories
pub async fn handle_create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    let name = validate(&payload)?;
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name) VALUES ($1) RETURNING *",
    )
    .bind(name)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::unique_violation(e, "name"))?;
    Ok(Json(category))
}

/// PUT /categories/:id
pub async fn handle_update_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id)?;
    let name = validate(&payload)?;
    sqlx::query_as::<_, Category>("UPDATE categories SET name = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(name)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "name"))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}

/// DELETE /categories/:id
///
/// Links to articles go with the category (`ON DELETE CASCADE`).
pub async fn handle_delete_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Category {id} not found")));
    }
    Ok(StatusCode::OK)
}
