use std::sync::Arc;

use crate::errors::Result;
use crate::storage::{LinkRepository, LinkSummary};

/// Per-owner totals, read-only
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
}

impl StatsService {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Totals are computed from the same list that is returned, so
    /// `total_links == links.len()` even under concurrent writes.
    pub async fn summarize(&self, owner_id: i64) -> Result<LinkSummary> {
        let links = self.links.list_by_owner(owner_id).await?;
        let total_clicks = links.iter().map(|l| l.click_count).sum();

        Ok(LinkSummary {
            total_links: links.len() as i64,
            total_clicks,
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{
        ExternalProfile, Link, LinkTotals, MemoryStorage, NewLink, UserRepository,
    };
    use async_trait::async_trait;
    use chrono::Utc;

    /// aggregate_by_owner 返回的数字与列表不一致，模拟两次读取之间的并发写入
    struct StaleAggregate(MemoryStorage);

    #[async_trait]
    impl LinkRepository for StaleAggregate {
        async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
            self.0.find_by_code(code).await
        }

        async fn insert_link(&self, link: NewLink) -> Result<Link> {
            self.0.insert_link(link).await
        }

        async fn increment_clicks(&self, link_id: i64, delta: i64) -> Result<bool> {
            self.0.increment_clicks(link_id, delta).await
        }

        async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>> {
            self.0.list_by_owner(owner_id).await
        }

        async fn delete_owned_link(&self, owner_id: i64, link_id: i64) -> Result<bool> {
            self.0.delete_owned_link(owner_id, link_id).await
        }

        async fn aggregate_by_owner(&self, _owner_id: i64) -> Result<LinkTotals> {
            Ok(LinkTotals {
                total_links: 99,
                total_clicks: 999,
            })
        }
    }

    fn new_link(user_id: i64, code: &str) -> NewLink {
        NewLink {
            user_id,
            long_url: "https://example.com".to_string(),
            short_code: code.to_string(),
            short_url: format!("http://localhost:8080/{}", code),
            qr_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_summary_matches_returned_links() {
        let store = MemoryStorage::new();
        let owner = store
            .find_or_create_user(&ExternalProfile {
                provider_id: "p1".to_string(),
                email: "s@example.com".to_string(),
                name: "S".to_string(),
            })
            .await
            .unwrap()
            .id;
        let a = store.insert_link(new_link(owner, "statsaaa")).await.unwrap();
        store.insert_link(new_link(owner, "statsbbb")).await.unwrap();
        store.increment_clicks(a.id, 3).await.unwrap();

        let service = StatsService::new(Arc::new(StaleAggregate(store)));
        let summary = service.summarize(owner).await.unwrap();

        assert_eq!(summary.links.len(), 2);
        assert_eq!(summary.total_links, 2);
        assert_eq!(summary.total_clicks, 3);
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let service = StatsService::new(Arc::new(MemoryStorage::new()));
        let summary = service.summarize(7).await.unwrap();
        assert_eq!(summary, LinkSummary::default());
    }
}
