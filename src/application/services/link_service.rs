//! Link creation, redirect resolution, and administration.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, warn};

use crate::codegen::CodePipeline;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::url_normalizer::normalize_url;

/// How many pre-verified codes creation will burn before giving up when
/// every insert hits a unique-constraint rejection.
const INSERT_ATTEMPTS: usize = 3;

/// Service for creating, resolving, and managing short links.
///
/// Owns the code supply pipeline handle: link creation is the only consumer
/// of pre-verified codes.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    code_supply: CodePipeline,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        code_supply: CodePipeline,
        base_url: String,
    ) -> Self {
        Self {
            links,
            cache,
            code_supply,
            base_url,
        }
    }

    /// Creates a short link for `long_url`.
    ///
    /// The code comes from the supply buffer, so no generation or uniqueness
    /// probing happens on the request path. A buffered code was unique when
    /// verified, but a concurrent creation can win the insert race in the
    /// window since; on a unique-constraint rejection the code is discarded
    /// and a fresh one drawn, up to [`INSERT_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for malformed or non-HTTP(S) URLs
    /// - [`AppError::Unavailable`] when the pipeline has been stopped
    /// - [`AppError::Conflict`] if every insert attempt collided
    pub async fn create_short_link(&self, long_url: String) -> Result<Link, AppError> {
        let normalized = normalize_url(&long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let code = self.code_supply.take().await?;

            match self
                .links
                .create(NewLink {
                    code,
                    long_url: normalized.clone(),
                })
                .await
            {
                Err(AppError::Conflict { .. }) if attempt < INSERT_ATTEMPTS => {
                    warn!(
                        attempt,
                        "pre-verified code collided at insert, retrying with a fresh code"
                    );
                }
                other => return other,
            }
        }
    }

    /// Resolves a code to its redirect target.
    ///
    /// Cache-aside: on a miss the database answer is written back
    /// fire-and-forget. Disabled and deleted links resolve to not-found.
    pub async fn resolve_for_redirect(&self, code: &str) -> Result<String, AppError> {
        match self.cache.get_url(code).await {
            Ok(Some(url)) => return Ok(url),
            Ok(None) => {}
            Err(e) => error!(code, error = %e, "cache lookup failed"),
        }

        let link = self
            .links
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found or disabled", json!({ "code": code }))
            })?;

        let cache = Arc::clone(&self.cache);
        let cache_code = code.to_string();
        let cache_url = link.long_url.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set_url(&cache_code, &cache_url).await {
                error!(code = %cache_code, error = %e, "failed to cache redirect target");
            }
        });

        Ok(link.long_url)
    }

    /// Lists links newest-first. `page` is 1-indexed.
    pub async fn list_links(&self, page: i64, page_size: i64) -> Result<Vec<Link>, AppError> {
        let offset = (page - 1) * page_size;
        self.links.list(page_size, offset).await
    }

    /// Flips a link's active flag and returns the new state.
    pub async fn toggle_active(&self, code: &str) -> Result<bool, AppError> {
        let link = self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        let new_state = !link.is_active;
        self.links.set_active(code, new_state).await?;

        let _ = self.cache.invalidate(code).await;

        Ok(new_state)
    }

    /// Soft-deletes a link. The code remains reserved forever.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        let _ = self.cache.invalidate(code).await;

        if !self.links.soft_delete(code).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        Ok(())
    }

    /// Composes the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Current occupancy of the code supply buffer, for health reporting.
    pub fn code_supply_occupancy(&self) -> usize {
        self.code_supply.occupancy()
    }
}
