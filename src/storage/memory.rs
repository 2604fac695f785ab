//! In-process storage backend
//!
//! Selected with `database_url = "memory://"`. Everything is lost on restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::{QrShortenError, Result};

use super::models::{ExternalProfile, Link, LinkTotals, NewLink, User};
use super::traits::{LinkRepository, UserRepository};

#[derive(Default)]
struct Inner {
    next_user_id: i64,
    next_link_id: i64,
    users: HashMap<i64, User>,
    users_by_email: HashMap<String, i64>,
    // BTreeMap 保证按 id 有序
    links: BTreeMap<i64, Link>,
    links_by_code: HashMap<String, i64>,
}

/// 内存存储，锁不会跨越 await
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_count(&self) -> usize {
        self.inner.lock().links.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStorage {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.lock().users.get(&id).cloned())
    }

    async fn find_or_create_user(&self, profile: &ExternalProfile) -> Result<User> {
        let mut inner = self.inner.lock();
        if let Some(id) = inner.users_by_email.get(&profile.email)
            && let Some(user) = inner.users.get(id)
        {
            return Ok(user.clone());
        }

        if inner
            .users
            .values()
            .any(|u| u.provider_id == profile.provider_id)
        {
            return Err(QrShortenError::database_operation(format!(
                "provider_id already bound to another email: {}",
                profile.provider_id
            )));
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            email: profile.email.clone(),
            name: profile.name.clone(),
            provider_id: profile.provider_id.clone(),
            created_at: Utc::now(),
        };
        inner.users_by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        debug!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }
}

#[async_trait]
impl LinkRepository for MemoryStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        let inner = self.inner.lock();
        Ok(inner
            .links_by_code
            .get(code)
            .and_then(|id| inner.links.get(id))
            .cloned())
    }

    async fn insert_link(&self, link: NewLink) -> Result<Link> {
        let mut inner = self.inner.lock();
        if inner.links_by_code.contains_key(&link.short_code) {
            return Err(QrShortenError::duplicate_code(format!(
                "short code already exists: {}",
                link.short_code
            )));
        }
        if !inner.users.contains_key(&link.user_id) {
            return Err(QrShortenError::database_operation(format!(
                "foreign key violation: user {} does not exist",
                link.user_id
            )));
        }

        inner.next_link_id += 1;
        let link = link.into_link(inner.next_link_id);
        inner.links_by_code.insert(link.short_code.clone(), link.id);
        inner.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn increment_clicks(&self, link_id: i64, delta: i64) -> Result<bool> {
        let mut inner = self.inner.lock();
        match inner.links.get_mut(&link_id) {
            Some(link) => {
                link.click_count += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>> {
        let inner = self.inner.lock();
        Ok(inner
            .links
            .values()
            .filter(|l| l.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_owned_link(&self, owner_id: i64, link_id: i64) -> Result<bool> {
        let mut inner = self.inner.lock();
        let owned = inner
            .links
            .get(&link_id)
            .is_some_and(|l| l.user_id == owner_id);
        if !owned {
            return Ok(false);
        }
        if let Some(link) = inner.links.remove(&link_id) {
            inner.links_by_code.remove(&link.short_code);
        }
        Ok(true)
    }

    async fn aggregate_by_owner(&self, owner_id: i64) -> Result<LinkTotals> {
        let inner = self.inner.lock();
        Ok(inner
            .links
            .values()
            .filter(|l| l.user_id == owner_id)
            .fold(LinkTotals::default(), |acc, l| LinkTotals {
                total_links: acc.total_links + 1,
                total_clicks: acc.total_clicks + l.click_count,
            }))
    }
}
