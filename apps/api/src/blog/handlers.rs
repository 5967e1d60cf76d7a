//! Axum route handlers for the Blog API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::blog::{BlogArticle, BlogPayload};
use crate::models::RecordKey;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    /// Substring of a category name.
    pub categories: Option<String>,
}

/// GET /blog
pub async fn handle_list_blogs(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<Vec<BlogArticle>>, AppError> {
    let filter = query.categories.as_deref().filter(|c| !c.is_empty());
    Ok(Json(state.blog.list(filter).await?))
}

/// GET /blog/:id_or_alias
pub async fn handle_get_blog(
    State(state): State<AppState>,
    Path(id_or_alias): Path<String>,
) -> Result<Json<BlogArticle>, AppError> {
    let article = state.blog.get(&RecordKey::parse(&id_or_alias)).await?;
    Ok(Json(article))
}

/// POST /blog
pub async fn handle_create_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BlogPayload>,
) -> Result<Json<BlogArticle>, AppError> {
    let article = state.blog.create(user.user_id, payload).await?;
    Ok(Json(article))
}

/// PUT /blog/:id_or_alias
pub async fn handle_update_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id_or_alias): Path<String>,
    Json(payload): Json<BlogPayload>,
) -> Result<Json<BlogArticle>, AppError> {
    let key = RecordKey::parse(&id_or_alias);
    let article = state.blog.update(user.user_id, &key, payload).await?;
    Ok(Json(article))
}

/// DELETE /blog/:id_or_alias
pub async fn handle_delete_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id_or_alias): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = RecordKey::parse(&id_or_alias);
    state.blog.delete(user.user_id, &key).await?;
    Ok(StatusCode::OK)
}

/// GET /blog/categories
pub async fn handle_blog_categories() -> Redirect {
    Redirect::to("/categories")
}

/// GET /blog/categories/:id
pub async fn handle_blog_category(Path(id): Path<String>) -> Redirect {
    Redirect::to(&format!("/categories/{id}"))
}
