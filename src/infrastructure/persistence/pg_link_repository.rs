//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::codegen::CodeStore;
use crate::domain::entities::{Link, LinkStats, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str =
    "id, code, long_url, click_count, is_active, created_at, updated_at, deleted_at";

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "INSERT INTO links (code, long_url) VALUES ($1, $2) RETURNING {LINK_COLUMNS}"
        ))
        .bind(&new_link.code)
        .bind(&new_link.long_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE code = $1 AND is_active AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let links = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE deleted_at IS NULL
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE links SET click_count = click_count + 1, updated_at = now()
             WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn set_active(&self, code: &str, active: bool) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE links SET is_active = $2, updated_at = now()
             WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .bind(active)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE links SET deleted_at = now(), updated_at = now()
             WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        // Deliberately no deleted_at filter: a soft-deleted link still owns
        // its code forever.
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM links WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn aggregate_stats(&self) -> Result<LinkStats, AppError> {
        let (total_links, total_clicks, active_links) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT
                 COUNT(*),
                 COALESCE(SUM(click_count), 0)::bigint,
                 COUNT(*) FILTER (WHERE is_active)
             FROM links
             WHERE deleted_at IS NULL",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkStats {
            total_links,
            total_clicks,
            active_links,
        })
    }
}

#[async_trait]
impl CodeStore for PgLinkRepository {
    async fn code_exists(&self, code: &str) -> anyhow::Result<bool> {
        Ok(LinkRepository::code_exists(self, code).await?)
    }
}
