use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

use crate::app::AppState;
use crate::handlers::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

pub const ACCESS_TOKEN_LIFETIME: Duration = Duration::minutes(100);

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub sub: String,
    pub exp: i64,
}

pub fn generate_access_token(secret: &str, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (OffsetDateTime::now_utc() + ACCESS_TOKEN_LIFETIME).unix_timestamp(),
    };

    sign(secret, &claims)
}

fn signing_key(secret: &str) -> anyhow::Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| anyhow::anyhow!("invalid signing key: {}", err))
}

fn sign(secret: &str, claims: &Claims) -> anyhow::Result<String> {
    let key = signing_key(secret)?;
    Ok(claims.sign_with_key(&key)?)
}

/// Checks the signature and expiry of a token.
pub fn verify_access_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let key = signing_key(secret)?;
    let claims: Claims = token.verify_with_key(&key)?;

    if claims.exp < OffsetDateTime::now_utc().unix_timestamp() {
        anyhow::bail!("token for {} expired", claims.sub);
    }

    Ok(claims)
}

/// Caller identified by an `Authorization: Bearer <token>` header.
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let claims = verify_access_token(&state.jwt_secret, token)
            .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        Ok(AuthUser(claims))
    }
}
