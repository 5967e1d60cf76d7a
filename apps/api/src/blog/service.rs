//! Article write/sync, deletion and read paths.
//!
//! Every write keeps the row and the markdown file in agreement about which
//! alias is current:
//! 1. the row is written first, so alias collisions fail before any file is touched
//! 2. the body is written to `blog/<alias>.md`; if that fails the row write is
//!    compensated (inserted rows are deleted, updated rows restored)
//! 3. a file left behind by a rename is removed best-effort
//! 4. category links are reconciled against the previous set

use std::sync::Arc;

use bytes::Bytes;
use futures::future::{try_join, try_join_all};
use tracing::{info, warn};

use crate::blog::store::article_path;
use crate::blog::{BlobStore, BlogRepository};
use crate::blog::validation::{validate_payload, ArticleDraft};
use crate::errors::AppError;
use crate::models::blog::{BlogArticle, BlogPayload, BlogRow, Category, CategoryRef};
use crate::models::RecordKey;
use crate::reconcile::diff_by_key;

#[derive(Clone)]
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        BlogService { repo, blobs }
    }

    /// Summaries with categories; bodies are never loaded.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<BlogArticle>, AppError> {
        let rows = self.repo.list(category).await?;
        self.summaries(rows).await
    }

    pub async fn list_by_owners(&self, user_ids: &[i64]) -> Result<Vec<BlogArticle>, AppError> {
        let rows = self.repo.list_by_owners(user_ids).await?;
        self.summaries(rows).await
    }

    pub async fn get(&self, key: &RecordKey) -> Result<BlogArticle, AppError> {
        let row = self.find(key, None).await?;
        let bytes = self.blobs.read(&article_path(&row.alias)).await?;
        let content = String::from_utf8(bytes.to_vec()).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Body of blog '{}' is not valid UTF-8: {e}",
                row.alias
            ))
        })?;
        let categories = self.categories_of(row.id).await?;
        Ok(BlogArticle::new(row, categories, Some(content)))
    }

    pub async fn create(
        &self,
        user_id: i64,
        payload: BlogPayload,
    ) -> Result<BlogArticle, AppError> {
        let draft = validate_payload(payload)?;
        let categories = self.resolve_categories(&draft.categories).await?;

        let row = self.repo.insert(user_id, &draft.fields).await?;
        if let Err(err) = self.write_body(&row.alias, &draft).await {
            if let Err(cleanup) = self.repo.delete(row.id).await {
                warn!(blog_id = row.id, "Failed to roll back blog row: {cleanup}");
            }
            return Err(err);
        }
        info!(blog_id = row.id, alias = %row.alias, user_id, "Created blog");

        let categories = self.reconcile_categories(row.id, &[], &categories).await?;
        Ok(BlogArticle::new(row, categories, Some(draft.content)))
    }

    /// Full replacement of an article owned by `user_id`. A non-owner gets
    /// not-found, never a distinguishable forbidden.
    pub async fn update(
        &self,
        user_id: i64,
        key: &RecordKey,
        payload: BlogPayload,
    ) -> Result<BlogArticle, AppError> {
        let existing = self.find(key, Some(user_id)).await?;
        let draft = validate_payload(payload)?;
        let categories = self.resolve_categories(&draft.categories).await?;
        let previous = self.categories_of(existing.id).await?;

        let row = self.repo.update(existing.id, &draft.fields).await?;
        if let Err(err) = self.write_body(&row.alias, &draft).await {
            if let Err(cleanup) = self.repo.update(existing.id, &existing.fields()).await {
                warn!(blog_id = existing.id, "Failed to restore blog row: {cleanup}");
            }
            return Err(err);
        }
        if existing.alias != row.alias {
            self.remove_body(&existing.alias).await;
            info!(blog_id = row.id, from = %existing.alias, to = %row.alias, "Renamed blog");
        }
        info!(blog_id = row.id, alias = %row.alias, user_id, "Updated blog");

        let categories = self
            .reconcile_categories(row.id, &previous, &categories)
            .await?;
        Ok(BlogArticle::new(row, categories, Some(draft.content)))
    }

    /// Succeeds once the row is gone; the body file is removed best-effort.
    pub async fn delete(&self, user_id: i64, key: &RecordKey) -> Result<(), AppError> {
        let existing = self.find(key, Some(user_id)).await?;
        let attached = self.categories_of(existing.id).await?;

        try_join_all(
            attached
                .iter()
                .map(|c| self.repo.detach(existing.id, c.id)),
        )
        .await?;
        self.repo.delete(existing.id).await?;
        self.remove_body(&existing.alias).await;

        info!(blog_id = existing.id, alias = %existing.alias, user_id, "Deleted blog");
        Ok(())
    }

    async fn find(&self, key: &RecordKey, owner: Option<i64>) -> Result<BlogRow, AppError> {
        self.repo
            .find(key, owner)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blog {key} not found")))
    }

    async fn summaries(&self, rows: Vec<BlogRow>) -> Result<Vec<BlogArticle>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut categories = self.repo.categories_of(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let cats = categories.remove(&row.id).unwrap_or_default();
                BlogArticle::new(row, cats, None)
            })
            .collect())
    }

    async fn categories_of(&self, blog_id: i64) -> Result<Vec<Category>, AppError> {
        Ok(self
            .repo
            .categories_of(&[blog_id])
            .await?
            .remove(&blog_id)
            .unwrap_or_default())
    }

    /// Every reference must match an existing category; nothing is created.
    async fn resolve_categories(&self, refs: &[CategoryRef]) -> Result<Vec<Category>, AppError> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = refs.iter().filter_map(|r| r.id).collect();
        let names: Vec<String> = refs
            .iter()
            .filter(|r| r.id.is_none())
            .filter_map(|r| r.name.clone())
            .collect();
        let known = self.repo.find_categories(&ids, &names).await?;

        refs.iter()
            .map(|r| {
                let found = match (r.id, &r.name) {
                    (Some(id), _) => known.iter().find(|c| c.id == id),
                    (None, Some(name)) => known.iter().find(|c| &c.name == name),
                    (None, None) => {
                        return Err(AppError::UnprocessableEntity(
                            "Category references need an 'id' or a 'name'.".to_string(),
                        ))
                    }
                };
                found.cloned().ok_or_else(|| {
                    let label = r
                        .id
                        .map(|id| id.to_string())
                        .or_else(|| r.name.clone())
                        .unwrap_or_default();
                    AppError::UnprocessableEntity(format!("Category '{label}' does not exist."))
                })
            })
            .collect()
    }

    /// Attaches and detaches concurrently, then reloads the stored set.
    async fn reconcile_categories(
        &self,
        blog_id: i64,
        current: &[Category],
        desired: &[Category],
    ) -> Result<Vec<Category>, AppError> {
        let diff = diff_by_key(current, desired, |c| c.id);
        if diff.is_empty() {
            return self.categories_of(blog_id).await;
        }

        let attaches = diff.added.iter().map(|c| self.repo.attach(blog_id, c.id));
        let detaches = diff.removed.iter().map(|c| self.repo.detach(blog_id, c.id));
        try_join(try_join_all(attaches), try_join_all(detaches)).await?;

        self.categories_of(blog_id).await
    }

    async fn write_body(&self, alias: &str, draft: &ArticleDraft) -> Result<(), AppError> {
        self.blobs
            .write(&article_path(alias), Bytes::from(draft.content.clone()))
            .await?;
        Ok(())
    }

    async fn remove_body(&self, alias: &str) {
        let path = article_path(alias);
        if let Err(e) = self.blobs.delete(&path).await {
            warn!(path = %path, "Failed to remove stale blog body: {e}");
        }
    }
}
