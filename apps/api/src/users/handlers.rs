//! Axum route handlers for user accounts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::auth::password::hash_password_blocking;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::blog::BlogArticle;
use crate::models::social::{SocialLink, SocialLinkPayload};
use crate::models::user::{NewUser, User, UserProfileFields};
use crate::models::RecordKey;
use crate::social::links::insert_link;
use crate::state::AppState;
use crate::users::avatar::avatar_blob_path;
use crate::users::includes::{load_profiles, IncludeQuery, UserProfile};
use crate::users::{find_self, find_user};

const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(user: &NewUser) -> Result<String, AppError> {
    let username = user.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    // Numeric path segments always resolve as ids.
    if username.parse::<i64>().is_ok() {
        return Err(AppError::Validation(
            "username must not be purely numeric".to_string(),
        ));
    }
    if username.contains('/') || username.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(
            "username must not contain '/' or whitespace".to_string(),
        ));
    }
    if user.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(username.to_string())
}

/// POST /users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<Json<User>, AppError> {
    let username = validate_registration(&payload)?;
    let password_hash = hash_password_blocking(payload.password).await?;
    let profile = payload.profile;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (username, password_hash, first_name, last_name, screen_name,
             phone, email_address, about_me, location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&username)
    .bind(&password_hash)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.screen_name)
    .bind(&profile.phone)
    .bind(&profile.email_address)
    .bind(&profile.about_me)
    .bind(&profile.location)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::unique_violation(e, "username"))?;

    info!(user_id = user.id, username = %user.username, "Registered user");
    Ok(Json(user))
}

/// GET /users
pub async fn handle_list_users(
    State(state): State<AppState>,
    Query(include): Query<IncludeQuery>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(load_profiles(&state, users, include).await?))
}

async fn one_profile(
    state: &AppState,
    key: &RecordKey,
    include: IncludeQuery,
) -> Result<UserProfile, AppError> {
    let user = find_user(&state.db, key).await?;
    load_profiles(state, vec![user], include)
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("User {key} not found")))
}

/// GET /users/:id_or_username
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id_or_username): Path<String>,
    Query(include): Query<IncludeQuery>,
) -> Result<Json<UserProfile>, AppError> {
    let key = RecordKey::parse(&id_or_username);
    Ok(Json(one_profile(&state, &key, include).await?))
}

/// GET /users/:id_or_username/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id_or_username): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let key = RecordKey::parse(&id_or_username);
    Ok(Json(
        one_profile(&state, &key, IncludeQuery::everything()).await?,
    ))
}

/// GET /users/:id_or_username/blog
pub async fn handle_list_user_blogs(
    State(state): State<AppState>,
    Path(id_or_username): Path<String>,
) -> Result<Json<Vec<BlogArticle>>, AppError> {
    let user = find_user(&state.db, &RecordKey::parse(&id_or_username)).await?;
    Ok(Json(state.blog.list_by_owners(&[user.id]).await?))
}

/// PUT /users/:id_or_username
///
/// Replaces the editable profile fields of the caller's own account.
pub async fn handle_update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id_or_username): Path<String>,
    Json(profile): Json<UserProfileFields>,
) -> Result<Json<User>, AppError> {
    let user = find_self(&state.db, &RecordKey::parse(&id_or_username), caller.user_id).await?;
    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET first_name = $2, last_name = $3, screen_name = $4, phone = $5,
            email_address = $6, about_me = $7, location = $8, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.screen_name)
    .bind(&profile.phone)
    .bind(&profile.email_address)
    .bind(&profile.about_me)
    .bind(&profile.location)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(updated))
}

/// DELETE /users/:id_or_username
///
/// Articles go through the blog service first so their markdown files are
/// removed with them; everything else cascades with the row.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id_or_username): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = find_self(&state.db, &RecordKey::parse(&id_or_username), caller.user_id).await?;

    for article in state.blog.list_by_owners(&[user.id]).await? {
        state
            .blog
            .delete(user.id, &RecordKey::Id(article.id))
            .await?;
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if let Some(path) = user.avatar_url.as_deref().and_then(avatar_blob_path) {
        if let Err(e) = state.blobs.delete(&path).await {
            warn!(user_id = user.id, path = %path, "Failed to remove profile image: {e}");
        }
    }

    info!(user_id = user.id, username = %user.username, "Deleted user");
    Ok(StatusCode::OK)
}

/// POST /users/:id_or_username/social_networking
pub async fn handle_create_user_social_link(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id_or_username): Path<String>,
    Json(payload): Json<SocialLinkPayload>,
) -> Result<Json<SocialLink>, AppError> {
    let user = find_self(&state.db, &RecordKey::parse(&id_or_username), caller.user_id).await?;
    Ok(Json(insert_link(&state.db, user.id, &payload).await?))
}
