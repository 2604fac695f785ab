use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::errors::{QrShortenError, Result};

/// Identity token claims. Any other payload shape is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
}

/// HS256 token issuer / verifier
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 过期时间手动检查（now < exp，无 leeway）
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: i64::try_from(ttl_hours)
                .unwrap_or(i64::MAX)
                .saturating_mul(3600),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_hours)
    }

    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        self.issue_token_at(user_id, Utc::now().timestamp())
    }

    pub fn issue_token_at(&self, user_id: i64, now: i64) -> Result<String> {
        let claims = Claims {
            user_id,
            exp: now.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| QrShortenError::config(format!("Failed to sign token: {}", e)))
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify_token(&self, token: &str) -> Result<i64> {
        self.verify_token_at(token, Utc::now().timestamp())
    }

    pub fn verify_token_at(&self, token: &str, now: i64) -> Result<i64> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            QrShortenError::unauthorized("invalid token")
        })?;

        if now >= data.claims.exp {
            debug!("Token rejected: expired at {}", data.claims.exp);
            return Err(QrShortenError::unauthorized("invalid token"));
        }

        Ok(data.claims.user_id)
    }
}
