//! Sign-in via an external identity provider
//!
//! `begin_sign_in` → browser visits the provider → callback hands back
//! `code` + `state` → `complete_sign_in` checks state against the cookie,
//! exchanges the code, finds or creates the user and issues a token.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use subtle::ConstantTimeEq;
use tracing::info;
use url::Url;

use crate::api::jwt::JwtService;
use crate::errors::{QrShortenError, Result};
use crate::services::identity::IdentityProvider;
use crate::storage::{User, UserRepository};

#[derive(Debug, Clone)]
pub struct SignInStart {
    pub authorize_url: String,
    pub state: String,
}

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    frontend_redirect_url: String,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        jwt: Arc<JwtService>,
        frontend_redirect_url: &str,
    ) -> Self {
        Self {
            provider,
            users,
            jwt,
            frontend_redirect_url: frontend_redirect_url.to_string(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn begin_sign_in(&self) -> Result<SignInStart> {
        let state = URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>());
        let authorize_url = self.provider.authorize_url(&state)?;
        Ok(SignInStart {
            authorize_url,
            state,
        })
    }

    /// Returns a freshly issued token for the signed-in user.
    pub async fn complete_sign_in(
        &self,
        code: &str,
        state: &str,
        cookie_state: Option<&str>,
    ) -> Result<String> {
        let expected = cookie_state.unwrap_or_default();
        let state_ok: bool = state.as_bytes().ct_eq(expected.as_bytes()).into();
        if expected.is_empty() || !state_ok {
            return Err(QrShortenError::unauthorized("invalid sign-in state"));
        }
        if code.is_empty() {
            return Err(QrShortenError::validation("missing authorization code"));
        }

        let profile = self.provider.exchange(code).await?;
        let user = self.users.find_or_create_user(&profile).await?;
        info!("User {} signed in via {}", user.id, self.provider.name());

        self.jwt.issue_token(user.id)
    }

    /// Frontend URL with `token` appended as a query parameter
    pub fn redirect_with_token(&self, token: &str) -> Result<String> {
        let mut url = Url::parse(&self.frontend_redirect_url).map_err(|e| {
            QrShortenError::config(format!("invalid auth.frontend_redirect_url: {}", e))
        })?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url.into())
    }

    pub async fn profile(&self, user_id: i64) -> Result<User> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| QrShortenError::not_found("user not found"))
    }
}
