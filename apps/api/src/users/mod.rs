// User accounts: registration, profile reads with optional eager-loaded
// sections, self-service updates, and the profile image upload.

pub mod avatar;
pub mod handlers;
pub mod includes;

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::User;
use crate::models::RecordKey;

/// Looks a user up by numeric id or by username.
pub(crate) async fn find_user(db: &PgPool, key: &RecordKey) -> Result<User, AppError> {
    let user = match key {
        RecordKey::Id(id) => {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(db)
                .await?
        }
        RecordKey::Name(username) => {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(db)
                .await?
        }
    };
    user.ok_or_else(|| AppError::NotFound(format!("User {key} not found")))
}

/// Resolves `key` to the caller's own account. Addressing anyone else is
/// reported as not-found.
pub(crate) async fn find_self(
    db: &PgPool,
    key: &RecordKey,
    caller: i64,
) -> Result<User, AppError> {
    let user = find_user(db, key).await?;
    if user.id != caller {
        return Err(AppError::NotFound(format!("User {key} not found")));
    }
    Ok(user)
}
