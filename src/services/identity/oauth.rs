//! OAuth2 authorization-code provider (Google by default)

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;
use url::Url;

use super::IdentityProvider;
use crate::config::OAuthConfig;
use crate::errors::{QrShortenError, Result};
use crate::storage::ExternalProfile;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google v2 returns `id`, OIDC userinfo returns `sub`
#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl UserInfo {
    fn into_profile(self) -> Result<ExternalProfile> {
        let provider_id = self
            .id
            .or(self.sub)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QrShortenError::upstream("userinfo response has no subject id"))?;
        let email = self
            .email
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QrShortenError::upstream("userinfo response has no email"))?;
        let name = self.name.unwrap_or_else(|| email.clone());

        Ok(ExternalProfile {
            provider_id,
            email,
            name,
        })
    }
}

pub struct OAuthProvider {
    agent: Agent,
    config: OAuthConfig,
}

impl OAuthProvider {
    pub fn new(config: &OAuthConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            config: config.clone(),
        }
    }

    /// 同步执行 token 交换 + userinfo 查询（在 spawn_blocking 中调用）
    fn exchange_sync(agent: Agent, config: OAuthConfig, code: String) -> Result<ExternalProfile> {
        let token: TokenResponse = agent
            .post(&config.token_url)
            .send_form([
                ("code", code.as_str()),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("redirect_uri", config.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .map_err(|e| QrShortenError::upstream(format!("token exchange failed: {}", e)))?
            .into_body()
            .read_json()
            .map_err(|e| QrShortenError::upstream(format!("token response parse failed: {}", e)))?;

        let info: UserInfo = agent
            .get(&config.userinfo_url)
            .header("Authorization", &format!("Bearer {}", token.access_token))
            .call()
            .map_err(|e| QrShortenError::upstream(format!("userinfo request failed: {}", e)))?
            .into_body()
            .read_json()
            .map_err(|e| {
                QrShortenError::upstream(format!("userinfo response parse failed: {}", e))
            })?;

        info.into_profile()
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", state),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| QrShortenError::config(format!("invalid oauth.auth_url: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange(&self, code: &str) -> Result<ExternalProfile> {
        let agent = self.agent.clone();
        let config = self.config.clone();
        let code = code.to_string();

        let profile = tokio::task::spawn_blocking(move || Self::exchange_sync(agent, config, code))
            .await
            .map_err(|e| QrShortenError::upstream(format!("oauth task failed: {}", e)))?
            .inspect_err(|e| warn!("{} sign-in exchange failed: {}", self.config.provider_name, e))?;

        debug!("{} sign-in for {}", self.config.provider_name, profile.email);
        Ok(profile)
    }
}
