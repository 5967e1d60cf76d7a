// Résumé sections owned by a user: education, experience (with industries),
// skills and projects. Reads are public; writes are filtered by owner so a
// non-owner sees not-found.

pub mod education;
pub mod experience;
pub mod industries;
pub mod projects;
pub mod skills;

use crate::errors::AppError;

/// Rejects blank required text fields with a field-specific 422.
pub(crate) fn require_text(value: &str, key: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "Value required for key '{key}'."
        )));
    }
    Ok(())
}

pub(crate) fn not_found(kind: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{kind} {id} not found"))
}
