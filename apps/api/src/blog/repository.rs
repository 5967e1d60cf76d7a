//! Row access for articles and their category links.
//!
//! The sync logic in `service` only talks to `BlogRepository`, so it runs
//! unchanged against PostgreSQL (`PgBlogRepository`) and the in-memory
//! repository used by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::group_by;
use crate::errors::AppError;
use crate::models::blog::{BlogCategoryLink, BlogFields, BlogRow, Category};
use crate::models::RecordKey;

#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Articles in id order, optionally limited to those with a category whose
    /// name contains `category` (case-insensitive).
    async fn list(&self, category: Option<&str>) -> Result<Vec<BlogRow>, AppError>;

    async fn list_by_owners(&self, user_ids: &[i64]) -> Result<Vec<BlogRow>, AppError>;

    /// `owner` restricts the lookup to rows of that user.
    async fn find(&self, key: &RecordKey, owner: Option<i64>)
        -> Result<Option<BlogRow>, AppError>;

    /// Fails with 422 when the alias is taken.
    async fn insert(&self, user_id: i64, fields: &BlogFields) -> Result<BlogRow, AppError>;

    /// Fails with 422 when the alias is taken.
    async fn update(&self, id: i64, fields: &BlogFields) -> Result<BlogRow, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn categories_of(&self, blog_ids: &[i64])
        -> Result<HashMap<i64, Vec<Category>>, AppError>;

    /// Existing categories whose id is in `ids` or whose name is in `names`.
    async fn find_categories(
        &self,
        ids: &[i64],
        names: &[String],
    ) -> Result<Vec<Category>, AppError>;

    async fn attach(&self, blog_id: i64, category_id: i64) -> Result<(), AppError>;

    async fn detach(&self, blog_id: i64, category_id: i64) -> Result<(), AppError>;
}

/// Escapes LIKE metacharacters so `needle` matches as a literal substring.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct PgBlogRepository {
    pool: PgPool,
}

impl PgBlogRepository {
    pub fn new(pool: PgPool) -> Self {
        PgBlogRepository { pool }
    }
}

#[async_trait]
impl BlogRepository for PgBlogRepository {
    async fn list(&self, category: Option<&str>) -> Result<Vec<BlogRow>, AppError> {
        Ok(sqlx::query_as::<_, BlogRow>(
            r#"
            SELECT b.*
            FROM blogs b
            WHERE $1::TEXT IS NULL
               OR EXISTS (
                    SELECT 1
                    FROM blog_categories bc
                    JOIN categories c ON c.id = bc.category_id
                    WHERE bc.blog_id = b.id
                      AND c.name ILIKE '%' || $1 || '%' ESCAPE '\'
               )
            ORDER BY b.id
            "#,
        )
        .bind(category.map(escape_like))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_by_owners(&self, user_ids: &[i64]) -> Result<Vec<BlogRow>, AppError> {
        Ok(sqlx::query_as::<_, BlogRow>(
            "SELECT * FROM blogs WHERE user_id = ANY($1) ORDER BY id",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find(
        &self,
        key: &RecordKey,
        owner: Option<i64>,
    ) -> Result<Option<BlogRow>, AppError> {
        let row = match key {
            RecordKey::Id(id) => {
                sqlx::query_as::<_, BlogRow>(
                    "SELECT * FROM blogs WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)",
                )
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?
            }
            RecordKey::Name(alias) => {
                sqlx::query_as::<_, BlogRow>(
                    "SELECT * FROM blogs WHERE alias = $1 AND ($2::BIGINT IS NULL OR user_id = $2)",
                )
                .bind(alias)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(row)
    }

    async fn insert(&self, user_id: i64, fields: &BlogFields) -> Result<BlogRow, AppError> {
        sqlx::query_as::<_, BlogRow>(
            r#"
            INSERT INTO blogs (user_id, alias, title, artwork_url, excerpt, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&fields.alias)
        .bind(&fields.title)
        .bind(&fields.artwork_url)
        .bind(&fields.excerpt)
        .bind(&fields.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "alias"))
    }

    async fn update(&self, id: i64, fields: &BlogFields) -> Result<BlogRow, AppError> {
        sqlx::query_as::<_, BlogRow>(
            r#"
            UPDATE blogs
            SET alias = $2, title = $3, artwork_url = $4, excerpt = $5, tags = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.alias)
        .bind(&fields.title)
        .bind(&fields.artwork_url)
        .bind(&fields.excerpt)
        .bind(&fields.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "alias"))?
        .ok_or_else(|| AppError::NotFound(format!("Blog {id} not found")))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn categories_of(
        &self,
        blog_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Category>>, AppError> {
        let links = sqlx::query_as::<_, BlogCategoryLink>(
            r#"
            SELECT bc.blog_id, c.id, c.name
            FROM blog_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.blog_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(blog_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_by(links, |l| l.blog_id)
            .into_iter()
            .map(|(blog_id, links)| (blog_id, links.into_iter().map(Category::from).collect()))
            .collect())
    }

    async fn find_categories(
        &self,
        ids: &[i64],
        names: &[String],
    ) -> Result<Vec<Category>, AppError> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = ANY($1) OR name = ANY($2) ORDER BY id",
        )
        .bind(ids)
        .bind(names)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn attach(&self, blog_id: i64, category_id: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO blog_categories (blog_id, category_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(blog_id)
        .bind(category_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn detach(&self, blog_id: i64, category_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM blog_categories WHERE blog_id = $1 AND category_id = $2")
            .bind(blog_id)
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct Tables {
        next_id: i64,
        blogs: BTreeMap<i64, BlogRow>,
        categories: BTreeMap<i64, Category>,
        links: BTreeSet<(i64, i64)>,
    }

    /// `BlogRepository` over in-memory tables with the same uniqueness and
    /// owner-filter rules as the PostgreSQL schema.
    #[derive(Default)]
    pub struct MemoryBlogRepository {
        tables: Mutex<Tables>,
    }

    impl MemoryBlogRepository {
        pub fn with_categories(names: &[&str]) -> Self {
            let repo = Self::default();
            {
                let mut t = repo.tables.lock().unwrap();
                for (i, name) in names.iter().enumerate() {
                    let id = i as i64 + 1;
                    t.categories.insert(
                        id,
                        Category {
                            id,
                            name: name.to_string(),
                        },
                    );
                }
            }
            repo
        }

        pub fn category(&self, name: &str) -> Category {
            self.tables
                .lock()
                .unwrap()
                .categories
                .values()
                .find(|c| c.name == name)
                .cloned()
                .unwrap_or_else(|| panic!("no category named {name}"))
        }

        pub fn row_count(&self) -> usize {
            self.tables.lock().unwrap().blogs.len()
        }

        pub fn link_count(&self, blog_id: i64) -> usize {
            self.tables
                .lock()
                .unwrap()
                .links
                .iter()
                .filter(|(b, _)| *b == blog_id)
                .count()
        }

        fn alias_taken(t: &Tables, alias: &str, except: Option<i64>) -> bool {
            t.blogs
                .values()
                .any(|b| b.alias == alias && Some(b.id) != except)
        }

        fn alias_error() -> AppError {
            AppError::UnprocessableEntity("Value for key 'alias' already exists.".to_string())
        }
    }

    #[async_trait]
    impl BlogRepository for MemoryBlogRepository {
        async fn list(&self, category: Option<&str>) -> Result<Vec<BlogRow>, AppError> {
            let t = self.tables.lock().unwrap();
            let needle = category.map(str::to_lowercase);
            Ok(t.blogs
                .values()
                .filter(|b| match &needle {
                    None => true,
                    Some(needle) => t.links.iter().any(|(blog_id, category_id)| {
                        *blog_id == b.id
                            && t.categories
                                .get(category_id)
                                .is_some_and(|c| c.name.to_lowercase().contains(needle))
                    }),
                })
                .cloned()
                .collect())
        }

        async fn list_by_owners(&self, user_ids: &[i64]) -> Result<Vec<BlogRow>, AppError> {
            let t = self.tables.lock().unwrap();
            Ok(t.blogs
                .values()
                .filter(|b| user_ids.contains(&b.user_id))
                .cloned()
                .collect())
        }

        async fn find(
            &self,
            key: &RecordKey,
            owner: Option<i64>,
        ) -> Result<Option<BlogRow>, AppError> {
            let t = self.tables.lock().unwrap();
            Ok(t.blogs
                .values()
                .find(|b| {
                    let matches_key = match key {
                        RecordKey::Id(id) => b.id == *id,
                        RecordKey::Name(alias) => &b.alias == alias,
                    };
                    matches_key && owner.map_or(true, |o| o == b.user_id)
                })
                .cloned())
        }

        async fn insert(&self, user_id: i64, fields: &BlogFields) -> Result<BlogRow, AppError> {
            let mut t = self.tables.lock().unwrap();
            if Self::alias_taken(&t, &fields.alias, None) {
                return Err(Self::alias_error());
            }
            t.next_id += 1;
            let now = Utc::now();
            let row = BlogRow {
                id: t.next_id,
                user_id,
                alias: fields.alias.clone(),
                title: fields.title.clone(),
                artwork_url: fields.artwork_url.clone(),
                excerpt: fields.excerpt.clone(),
                tags: fields.tags.clone(),
                created_at: now,
                updated_at: now,
            };
            t.blogs.insert(row.id, row.clone());
            Ok(row)
        }

        async fn update(&self, id: i64, fields: &BlogFields) -> Result<BlogRow, AppError> {
            let mut t = self.tables.lock().unwrap();
            if Self::alias_taken(&t, &fields.alias, Some(id)) {
                return Err(Self::alias_error());
            }
            let row = t
                .blogs
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Blog {id} not found")))?;
            row.alias = fields.alias.clone();
            row.title = fields.title.clone();
            row.artwork_url = fields.artwork_url.clone();
            row.excerpt = fields.excerpt.clone();
            row.tags = fields.tags.clone();
            row.updated_at = Utc::now();
            Ok(row.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), AppError> {
            let mut t = self.tables.lock().unwrap();
            t.blogs.remove(&id);
            t.links.retain(|(blog_id, _)| *blog_id != id);
            Ok(())
        }

        async fn categories_of(
            &self,
            blog_ids: &[i64],
        ) -> Result<HashMap<i64, Vec<Category>>, AppError> {
            let t = self.tables.lock().unwrap();
            let mut out: HashMap<i64, Vec<Category>> = HashMap::new();
            for (blog_id, category_id) in &t.links {
                if blog_ids.contains(blog_id) {
                    if let Some(c) = t.categories.get(category_id) {
                        out.entry(*blog_id).or_default().push(c.clone());
                    }
                }
            }
            Ok(out)
        }

        async fn find_categories(
            &self,
            ids: &[i64],
            names: &[String],
        ) -> Result<Vec<Category>, AppError> {
            let t = self.tables.lock().unwrap();
            Ok(t.categories
                .values()
                .filter(|c| ids.contains(&c.id) || names.contains(&c.name))
                .cloned()
                .collect())
        }

        async fn attach(&self, blog_id: i64, category_id: i64) -> Result<(), AppError> {
            self.tables
                .lock()
                .unwrap()
                .links
                .insert((blog_id, category_id));
            Ok(())
        }

        async fn detach(&self, blog_id: i64, category_id: i64) -> Result<(), AppError> {
            self.tables
                .lock()
                .unwrap()
                .links
                .remove(&(blog_id, category_id));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_makes_wildcards_literal() {
        assert_eq!(escape_like("rust"), "rust");
        assert_eq!(escape_like("_"), "\\_");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
