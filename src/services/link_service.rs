//! Link lifecycle: mint, resolve, list, delete

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, trace, warn};

use crate::errors::{QrShortenError, Result};
use crate::services::code_generator::CodeGenerator;
use crate::services::qr::QrPublisher;
use crate::storage::{Link, LinkRepository, NewLink, UserRepository};

pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    users: Arc<dyn UserRepository>,
    generator: Arc<dyn CodeGenerator>,
    publisher: Arc<dyn QrPublisher>,
    base_url: String,
    max_code_attempts: u32,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn CodeGenerator>,
        publisher: Arc<dyn QrPublisher>,
        base_url: &str,
        max_code_attempts: u32,
    ) -> Self {
        Self {
            links,
            users,
            generator,
            publisher,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_code_attempts: max_code_attempts.max(1),
        }
    }

    pub fn short_url_for(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Mints a link for `owner_id`.
    ///
    /// The QR asset is published before the row is written; a publish
    /// failure aborts the call with nothing stored. A code collision at
    /// insert time starts another attempt with a fresh code.
    pub async fn create(&self, owner_id: i64, long_url: &str) -> Result<Link> {
        let long_url = long_url.trim();
        if long_url.is_empty() {
            return Err(QrShortenError::validation("long_url must not be empty"));
        }

        if self.users.find_user_by_id(owner_id).await?.is_none() {
            return Err(QrShortenError::not_found(format!(
                "user {} not found",
                owner_id
            )));
        }

        for attempt in 1..=self.max_code_attempts {
            let code = self.generator.generate();

            // 先探测，避免为已占用的短码上传二维码
            if self.links.find_by_code(&code).await?.is_some() {
                debug!("Short code '{}' taken (attempt {})", code, attempt);
                continue;
            }

            let short_url = self.short_url_for(&code);
            let qr_url = self
                .publisher
                .publish(&short_url, &code)
                .await
                .map_err(|e| match e {
                    QrShortenError::Upstream(_) => e,
                    other => QrShortenError::upstream(other.to_string()),
                })?;

            let new_link = NewLink {
                user_id: owner_id,
                long_url: long_url.to_string(),
                short_code: code.clone(),
                short_url,
                qr_url,
                created_at: Utc::now(),
            };

            match self.links.insert_link(new_link).await {
                Ok(link) => {
                    info!(
                        "LinkService: user {} created '{}' -> '{}'",
                        owner_id, link.short_code, link.long_url
                    );
                    return Ok(link);
                }
                Err(QrShortenError::DuplicateCode(_)) => {
                    warn!(
                        "Short code '{}' collided on insert (attempt {}/{})",
                        code, attempt, self.max_code_attempts
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(QrShortenError::resource_exhausted(format!(
            "no free short code after {} attempts",
            self.max_code_attempts
        )))
    }

    /// Returns the destination for `code` and counts the visit.
    pub async fn resolve(&self, code: &str) -> Result<String> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(|| QrShortenError::not_found("link not found"))?;

        // 删除与访问并发时，自增可能匹配不到行
        if !self.links.increment_clicks(link.id, 1).await? {
            return Err(QrShortenError::not_found("link not found"));
        }

        trace!("Resolved '{}' -> '{}'", code, link.long_url);
        Ok(link.long_url)
    }

    /// Every link of `owner_id`, ordered by id. There is no pagination.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>> {
        self.links.list_by_owner(owner_id).await
    }

    /// Deletes a link the caller owns. Absent and not-owned both yield `NotFound`.
    pub async fn delete_by_owner(&self, owner_id: i64, link_id: i64) -> Result<()> {
        if !self.links.delete_owned_link(owner_id, link_id).await? {
            return Err(QrShortenError::not_found("link not found"));
        }
        info!("LinkService: user {} deleted link {}", owner_id, link_id);
        Ok(())
    }
}
