//! External identity providers

mod oauth;

use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::ExternalProfile;

pub use oauth::OAuthProvider;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name as it appears in `/api/auth/{provider}`
    fn name(&self) -> &str;

    /// Consent page URL carrying `state`
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Trades an authorization code for the user's profile.
    async fn exchange(&self, code: &str) -> Result<ExternalProfile>;
}
