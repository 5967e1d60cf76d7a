use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A category attached to an article, as read from the join table.
#[derive(Debug, Clone, FromRow)]
pub struct BlogCategoryLink {
    pub blog_id: i64,
    pub id: i64,
    pub name: String,
}

impl From<BlogCategoryLink> for Category {
    fn from(link: BlogCategoryLink) -> Self {
        Category {
            id: link.id,
            name: link.name,
        }
    }
}

/// An article row. The markdown body is not stored here; it lives in the
/// blob store under the article's alias.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BlogRow {
    pub id: i64,
    pub user_id: i64,
    pub alias: String,
    pub title: String,
    pub artwork_url: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogRow {
    pub fn fields(&self) -> BlogFields {
        BlogFields {
            alias: self.alias.clone(),
            title: self.title.clone(),
            artwork_url: self.artwork_url.clone(),
            excerpt: self.excerpt.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Column values written on insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogFields {
    pub alias: String,
    pub title: String,
    pub artwork_url: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
}

/// Reference to an existing category in a write payload. `id` wins when both
/// fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRef {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// Create/update payload for `POST /blog` and `PUT /blog/:id_or_alias`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPayload {
    pub title: String,
    pub alias: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    pub artwork_url: Option<String>,
}

/// Article as returned by the API. `content` is only present on single reads
/// and writes; listings leave it out entirely.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticle {
    pub id: i64,
    pub user_id: i64,
    pub alias: String,
    pub title: String,
    pub artwork_url: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogArticle {
    pub fn new(row: BlogRow, categories: Vec<Category>, content: Option<String>) -> Self {
        BlogArticle {
            id: row.id,
            user_id: row.user_id,
            alias: row.alias,
            title: row.title,
            artwork_url: row.artwork_url,
            excerpt: row.excerpt,
            tags: row.tags,
            content,
            categories,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
}
