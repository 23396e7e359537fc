use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryCatalog, CategoryName, CategoryTranslation,
};
use crate::features::categories::repositories::{
    CategoryStore, CategoryUnitOfWork, PendingChange,
};
use crate::shared::constants::DEFAULT_LANGUAGE;

const CATEGORY_COLUMNS: &str = "id, url_slug, priority, image, parent_id";

/// Transaction-scoped advisory lock serializing commits that move categories
const HIERARCHY_LOCK_KEY: i64 = 0x6361_7465_676f_7279;

/// Convert database error to more specific AppError with user-friendly messages
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // Unique constraint violation (PostgreSQL error code 23505)
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("url_slug") {
                    return AppError::Conflict(
                        "A category with this URL slug already exists.".to_string(),
                    );
                }
                if constraint.contains("language") {
                    return AppError::Conflict(
                        "The category already has a translation in this language.".to_string(),
                    );
                }
            }
            return AppError::Conflict("Category already exists.".to_string());
        }

        // Foreign key violation (PostgreSQL error code 23503)
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::BadRequest("Referenced category does not exist.".to_string());
        }
    }

    AppError::Database(e)
}

/// PostgreSQL-backed category store
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_categories(&self, filter: &str) -> Result<Vec<Category>> {
        let query = format!(
            "SELECT {} FROM categories {} ORDER BY id",
            CATEGORY_COLUMNS, filter
        );

        sqlx::query_as::<_, Category>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn get_all(&self) -> Result<Vec<Category>> {
        self.fetch_categories("").await
    }

    async fn get_all_with_translations(&self) -> Result<CategoryCatalog> {
        // Both reads share one snapshot so translations match the categories
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;

        let translations = sqlx::query_as::<_, CategoryTranslation>(
            r#"
            SELECT category_id, language, name, description
            FROM category_translations
            ORDER BY category_id, id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CategoryCatalog {
            categories,
            translations,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by id: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(category)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE url_slug = $1",
            CATEGORY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by slug: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(category)
    }

    async fn get_roots(&self) -> Result<Vec<Category>> {
        self.fetch_categories("WHERE parent_id IS NULL").await
    }

    async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        let children = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE parent_id = $1 ORDER BY id",
            CATEGORY_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(children)
    }

    async fn get_names(&self) -> Result<Vec<CategoryName>> {
        let names = sqlx::query_as::<_, CategoryName>(
            r#"
            SELECT c.id, COALESCE(t.name, c.url_slug) AS name
            FROM categories c
            LEFT JOIN category_translations t
                ON t.category_id = c.id AND t.language = $1
            ORDER BY c.id
            "#,
        )
        .bind(DEFAULT_LANGUAGE)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    fn begin(&self) -> Box<dyn CategoryUnitOfWork> {
        Box::new(PgUnitOfWork {
            pool: self.pool.clone(),
            pending: Vec::new(),
        })
    }
}

/// Unit of work holding one caller's staged changes until `save`
struct PgUnitOfWork {
    pool: PgPool,
    pending: Vec<PendingChange>,
}

impl PgUnitOfWork {
    async fn apply(tx: &mut Transaction<'_, Postgres>, change: PendingChange) -> Result<()> {
        match change {
            PendingChange::Insert(category) => {
                let id: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO categories (url_slug, priority, image, parent_id)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&category.url_slug)
                .bind(category.priority)
                .bind(&category.image)
                .bind(category.parent_id)
                .fetch_one(&mut **tx)
                .await
                .map_err(handle_db_error)?;

                for translation in &category.translations {
                    sqlx::query(
                        r#"
                        INSERT INTO category_translations (category_id, language, name, description)
                        VALUES ($1, $2, $3, $4)
                        "#,
                    )
                    .bind(id)
                    .bind(&translation.language)
                    .bind(&translation.name)
                    .bind(&translation.description)
                    .execute(&mut **tx)
                    .await
                    .map_err(handle_db_error)?;
                }

                debug!("Inserted category id={}, slug={}", id, category.url_slug);
            }
            PendingChange::Update(category) => {
                sqlx::query(
                    r#"
                    UPDATE categories
                    SET url_slug = $1, priority = $2, image = $3, parent_id = $4, updated_at = NOW()
                    WHERE id = $5
                    "#,
                )
                .bind(&category.url_slug)
                .bind(category.priority)
                .bind(&category.image)
                .bind(category.parent_id)
                .bind(category.id)
                .execute(&mut **tx)
                .await
                .map_err(handle_db_error)?;

                debug!("Updated category id={}", category.id);
            }
            PendingChange::Delete(id) => {
                sqlx::query("DELETE FROM categories WHERE id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await
                    .map_err(handle_db_error)?;

                debug!("Deleted category id={}", id);
            }
        }

        Ok(())
    }

    /// Whether walking up from `id` through `parent_id` reaches `id` again
    async fn closes_cycle(tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<bool> {
        let cyclic: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE ancestors(id) AS (
                SELECT parent_id FROM categories WHERE id = $1
                UNION
                SELECT c.parent_id
                FROM categories c
                JOIN ancestors a ON c.id = a.id
                WHERE c.parent_id IS NOT NULL
            )
            SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(cyclic)
    }
}

#[async_trait]
impl CategoryUnitOfWork for PgUnitOfWork {
    fn stage(&mut self, change: PendingChange) {
        self.pending.push(change);
    }

    async fn save(&mut self) -> Result<()> {
        let changes = std::mem::take(&mut self.pending);
        if changes.is_empty() {
            return Ok(());
        }

        let moved: Vec<i64> = changes
            .iter()
            .filter_map(|change| match change {
                PendingChange::Update(category) => Some(category.id),
                _ => None,
            })
            .collect();

        let count = changes.len();
        let mut tx = self.pool.begin().await?;

        // Concurrent moves must see each other before the ancestry check
        if !moved.is_empty() {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(HIERARCHY_LOCK_KEY)
                .execute(&mut *tx)
                .await?;
        }

        for change in changes {
            Self::apply(&mut tx, change).await?;
        }

        for id in moved {
            if Self::closes_cycle(&mut tx, id).await? {
                return Err(AppError::Validation(format!(
                    "Category {} cannot be moved under its own descendant",
                    id
                )));
            }
        }

        tx.commit().await?;

        debug!("Committed {} staged category change(s)", count);
        Ok(())
    }
}
