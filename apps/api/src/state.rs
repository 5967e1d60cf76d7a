use std::sync::Arc;

use sqlx::PgPool;

use crate::blog::{BlobStore, BlogService};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Blob store for article bodies and profile images.
    pub blobs: Arc<dyn BlobStore>,
    pub blog: BlogService,
    pub config: Config,
}
