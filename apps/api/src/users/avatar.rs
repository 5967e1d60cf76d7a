//! Profile image upload and serving.
//!
//! Images are sniffed by magic bytes rather than trusting the client's file
//! name or content type, stored as `images/<uuid>.<ext>` in the blob store,
//! and served back under `/images/<file>`.

use std::io;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::User;
use crate::models::RecordKey;
use crate::state::AppState;
use crate::users::find_self;

pub const MAX_AVATAR_BYTES: usize = 100 * 1024;
const IMAGE_DIR: &str = "images";
const IMAGE_URL_PREFIX: &str = "/images/";

fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

fn mime_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Maps a stored `avatarUrl` back to its blob path. URLs that were not
/// issued by this server yield `None`.
pub fn avatar_blob_path(url: &str) -> Option<String> {
    let file = url.strip_prefix(IMAGE_URL_PREFIX)?;
    if file.is_empty() || file.starts_with('.') || file.contains('/') {
        return None;
    }
    Some(format!("{IMAGE_DIR}/{file}"))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!(
            "Profile image must be at most {} KiB.",
            MAX_AVATAR_BYTES / 1024
        ));
    }
    AppError::Validation(format!("Invalid multipart data: {e}"))
}

/// Pulls the `file` field out of the form, enforcing the size limit.
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Profile image must be at most {} KiB.",
                MAX_AVATAR_BYTES / 1024
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("Empty file".to_string()));
        }
        return Ok(bytes);
    }
    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// PATCH /users/:id_or_username/profile_image
pub async fn handle_upload_profile_image(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id_or_username): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<User>, AppError> {
    let user = find_self(&state.db, &RecordKey::parse(&id_or_username), caller.user_id).await?;

    let bytes = read_file_field(&mut multipart).await?;
    let mime = sniff_image(&bytes).ok_or_else(|| {
        AppError::UnprocessableEntity(
            "File content does not match an allowed image type.".to_string(),
        )
    })?;

    let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(mime));
    let path = format!("{IMAGE_DIR}/{file_name}");
    let size = bytes.len();
    state.blobs.write(&path, bytes).await?;

    let url = format!("{IMAGE_URL_PREFIX}{file_name}");
    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET avatar_url = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&url)
    .fetch_one(&state.db)
    .await;
    let updated = match updated {
        Ok(updated) => updated,
        Err(e) => {
            if let Err(cleanup) = state.blobs.delete(&path).await {
                warn!(path = %path, "Failed to remove orphaned profile image: {cleanup}");
            }
            return Err(e.into());
        }
    };

    if let Some(old) = user.avatar_url.as_deref().and_then(avatar_blob_path) {
        if let Err(e) = state.blobs.delete(&old).await {
            warn!(user_id = user.id, path = %old, "Failed to remove previous profile image: {e}");
        }
    }

    info!(user_id = user.id, file = %file_name, size, "Updated profile image");
    Ok(Json(updated))
}

/// GET /images/:file
pub async fn handle_get_image(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let path = avatar_blob_path(&format!("{IMAGE_URL_PREFIX}{file}"))
        .ok_or_else(|| AppError::NotFound(format!("Image '{file}' not found")))?;
    let bytes = state.blobs.read(&path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => {
            AppError::NotFound(format!("Image '{file}' not found"))
        }
        _ => AppError::Storage(e),
    })?;
    Ok(([(header::CONTENT_TYPE, mime_for(&file))], bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_recognises_common_formats() {
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(
            sniff_image(b"\x89PNG\r\n\x1a\n"),
            Some("image/png")
        );
        assert_eq!(sniff_image(b"GIF89a"), Some("image/gif"));
        assert_eq!(sniff_image(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
    }

    #[test]
    fn test_sniff_rejects_non_images() {
        assert_eq!(sniff_image(b"<svg xmlns"), None);
        assert_eq!(sniff_image(b""), None);
    }

    #[test]
    fn test_extension_follows_sniffed_type() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(mime_for("abc.jpg"), "image/jpeg");
        assert_eq!(mime_for("abc"), "application/octet-stream");
    }

    #[test]
    fn test_avatar_blob_path_only_accepts_local_images() {
        assert_eq!(
            avatar_blob_path("/images/1f2e.png").as_deref(),
            Some("images/1f2e.png")
        );
        assert_eq!(avatar_blob_path("https://cdn.example.com/a.png"), None);
        assert_eq!(avatar_blob_path("/images/../secret"), None);
        assert_eq!(avatar_blob_path("/images/"), None);
    }
}
