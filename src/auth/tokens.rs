// auth/tokens.rs — stateless session tokens.
//
// HS256-signed bearer tokens carrying the user id in `sub`, valid for
// `token_ttl_days` (default 7). No server-side session store: possession of
// an unexpired, correctly-signed token IS the session.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::storage::Storage;

const SECRET_SETTING_KEY: &str = "token_secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a token for `user_id`, valid from now for the configured window.
    pub fn issue(&self, user_id: &str) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ServiceError::Store(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry; returns the user id on success.
    /// Any failure collapses to `Unauthenticated` — callers never learn why.
    pub fn verify(&self, token: &str) -> Result<String, ServiceError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|_| ServiceError::Unauthenticated)
    }
}

/// Resolve the token-signing secret.
///
/// A configured secret (env var or config.toml) wins. Otherwise a random
/// secret is generated on first run and persisted in the settings table, so
/// tokens survive restarts.
pub async fn get_or_create_secret(
    storage: &Storage,
    configured: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(secret) = configured {
        return Ok(secret.to_string());
    }
    if let Some(secret) = storage.get_setting(SECRET_SETTING_KEY).await? {
        return Ok(secret);
    }

    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let secret = hex::encode(bytes);
    storage.set_setting(SECRET_SETTING_KEY, &secret).await?;
    Ok(secret)
}
