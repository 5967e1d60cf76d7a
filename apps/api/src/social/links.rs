//! Axum route handlers for a user's social networking links. Every read joins
//! the service so responses carry it nested.

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
use crate::models::social::{SocialLink, SocialLinkPayload, SocialLinkRecord};
use crate::resume::{not_found, require_text};
use crate::state::AppState;

const SELECT_LINKS: &str = r#"
    SELECT sn.id, sn.user_id, sn.url, sn.service_id,
           svc.name AS service_name, svc.type AS service_type,
           sn.created_at, sn.updated_at
    FROM social_networking sn
    JOIN social_networking_services svc ON svc.id = sn.service_id
"#;

async fn find_link(db: &PgPool, id: i64) -> Result<Option<SocialLink>, AppError> {
    let record = sqlx::query_as::<_, SocialLinkRecord>(&format!("{SELECT_LINKS} WHERE sn.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(record.map(SocialLink::from))
}

pub async fn links_for_users(
    db: &PgPool,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<SocialLink>>, AppError> {
    let records = sqlx::query_as::<_, SocialLinkRecord>(&format!(
        "{SELECT_LINKS} WHERE sn.user_id = ANY($1) ORDER BY sn.id"
    ))
    .bind(user_ids)
    .fetch_all(db)
    .await?;
    let links = records.into_iter().map(SocialLink::from).collect();
    Ok(group_by(links, |l: &SocialLink| l.user_id))
}

/// Creates a link owned by `user_id`; an unknown service is a 422.
pub async fn insert_link(
    db: &PgPool,
    user_id: i64,
    payload: &SocialLinkPayload,
) -> Result<SocialLink, AppError> {
    require_text(&payload.url, "url")?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO social_networking (user_id, service_id, url) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(payload.service_id)
    .bind(payload.url.trim())
    .fetch_one(db)
    .await
    .map_err(|e| AppError::foreign_key_violation(e, "serviceId"))?;

    find_link(db, id).await?.ok_or_else(|| not_found("Social networking link", id))
}

/// GET /social
pub async fn handle_list_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialLink>>, AppError> {
    let records = sqlx::query_as::<_, SocialLinkRecord>(&format!("{SELECT_LINKS} ORDER BY sn.id"))
        .fetch_all(&state.db)
        .await?;
    Ok(Json(records.into_iter().map(SocialLink::from).collect()))
}

/// GET /social/:id
pub async fn handle_get_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SocialLink>, AppError> {
    let id = parse_id(&id)?;
    find_link(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Social networking link", id))
}

/// POST /social
pub async fn handle_create_link(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SocialLinkPayload>,
) -> Result<Json<SocialLink>, AppError> {
    Ok(Json(insert_link(&state.db, user.user_id, &payload).await?))
}

/// PUT /social/:id
pub async fn handle_update_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<SocialLinkPayload>,
) -> Result<Json<SocialLink>, AppError> {
    let id = parse_id(&id)?;
    require_text(&payload.url, "url")?;
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE social_networking
        SET url = $3, service_id = $4, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.url.trim())
    .bind(payload.service_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| AppError::foreign_key_violation(e, "serviceId"))?;

    if updated.is_none() {
        return Err(not_found("Social networking link", id));
    }
    find_link(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Social networking link", id))
}

/// DELETE /social/:id
pub async fn handle_delete_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM social_networking WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Social networking link", id));
    }
    Ok(StatusCode::OK)
}
