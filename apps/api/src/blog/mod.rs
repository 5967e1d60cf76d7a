// Markdown-backed blog: rows in PostgreSQL, bodies in the blob store.
// All writes go through `BlogService` so the two never disagree on the alias.

pub mod categories;
pub mod handlers;
pub mod repository;
pub mod service;
pub mod store;
pub mod validation;

pub use repository::{BlogRepository, PgBlogRepository};
pub use service::BlogService;
pub use store::{BlobStore, FsBlobStore};
