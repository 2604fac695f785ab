use async_trait::async_trait;

use crate::errors::Result;

use super::models::{ExternalProfile, Link, LinkTotals, NewLink, User};

/// Persistence seam for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Returns the user with `profile.email`, inserting it on first sign-in.
    ///
    /// Two concurrent first sign-ins for the same email converge on one row.
    async fn find_or_create_user(&self, profile: &ExternalProfile) -> Result<User>;
}

/// Persistence seam for links.
///
/// Every mutation is a single statement; implementations never read a row
/// and write it back.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>>;

    /// Fails with `DuplicateCode` when `short_code` is already taken.
    async fn insert_link(&self, link: NewLink) -> Result<Link>;

    /// `click_count = click_count + delta`; false when no row matched.
    async fn increment_clicks(&self, link_id: i64, delta: i64) -> Result<bool>;

    /// All links of `owner_id` ordered by id. Unpaginated.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>>;

    /// `DELETE ... WHERE id = ? AND user_id = ?`; false when nothing matched.
    async fn delete_owned_link(&self, owner_id: i64, link_id: i64) -> Result<bool>;

    /// COUNT(*) and COALESCE(SUM(click_count), 0) over the owner's links.
    async fn aggregate_by_owner(&self, owner_id: i64) -> Result<LinkTotals>;
}
