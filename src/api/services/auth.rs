//! 登录流程与当前用户信息

use std::sync::Arc;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::debug;

use crate::api::constants::{STATE_COOKIE_MAX_AGE_SECS, STATE_COOKIE_NAME, STATE_COOKIE_PATH};
use crate::api::middleware::AuthenticatedUser;
use crate::errors::{QrShortenError, Result};
use crate::services::AuthService;

use super::helpers::{found, json_ok};
use super::types::{CallbackQuery, ProfileResponse};

/// Whether cookies carry the `Secure` attribute
#[derive(Debug, Clone, Copy)]
pub struct SecureCookies(pub bool);

fn state_cookie(value: String, secure: bool, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(STATE_COOKIE_NAME, value)
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

fn ensure_provider(auth: &AuthService, provider: &str) -> Result<()> {
    if provider != auth.provider_name() {
        return Err(QrShortenError::not_found(format!(
            "unknown identity provider: {}",
            provider
        )));
    }
    Ok(())
}

/// GET /api/auth/{provider}
pub async fn begin(
    path: web::Path<String>,
    auth: web::Data<Arc<AuthService>>,
    secure: web::Data<SecureCookies>,
) -> Result<HttpResponse> {
    ensure_provider(&auth, &path)?;

    let start = auth.begin_sign_in()?;
    debug!("Redirecting to {} consent page", auth.provider_name());

    let mut resp = found(&start.authorize_url);
    resp.add_cookie(&state_cookie(start.state, secure.0, STATE_COOKIE_MAX_AGE_SECS))
        .map_err(|e| QrShortenError::config(format!("failed to set state cookie: {}", e)))?;
    Ok(resp)
}

/// GET /api/auth/{provider}/callback
pub async fn callback(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<CallbackQuery>,
    auth: web::Data<Arc<AuthService>>,
    secure: web::Data<SecureCookies>,
) -> Result<HttpResponse> {
    ensure_provider(&auth, &path)?;

    let cookie_state = req.cookie(STATE_COOKIE_NAME).map(|c| c.value().to_string());
    let token = auth
        .complete_sign_in(&query.code, &query.state, cookie_state.as_deref())
        .await?;
    let location = auth.redirect_with_token(&token)?;

    let mut resp = found(&location);
    // state 只能用一次
    resp.add_removal_cookie(&state_cookie(String::new(), secure.0, 0))
        .map_err(|e| QrShortenError::config(format!("failed to clear state cookie: {}", e)))?;
    Ok(resp)
}

/// GET /api/profile
pub async fn profile(
    user: AuthenticatedUser,
    auth: web::Data<Arc<AuthService>>,
) -> Result<HttpResponse> {
    let user = auth.profile(user.id()).await?;
    Ok(json_ok(&ProfileResponse::from(user)))
}
