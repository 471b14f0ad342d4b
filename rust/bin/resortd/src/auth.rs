//! Bearer JWT authentication for module routes.
//!
//! Tokens are HS256, issued by `/auth/login` and checked by
//! [`JwtAuthenticator`], which modules receive as their `Authenticator`.

use axum::http::HeaderMap;
use frontdesk::model::{Account, AccountRole};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use resort_core::{Authenticator, ServiceError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Display name.
    pub name: String,
    pub role: AccountRole,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expire_secs: u64,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, expire_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            expire_secs,
        }
    }

    pub fn expire_secs(&self) -> u64 {
        self.expire_secs
    }

    /// Sign a session token for an operator account.
    pub fn issue_token(&self, account: &Account) -> Result<String, ServiceError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: account.id.clone(),
            name: account.full_name.clone(),
            role: account.role,
            iat: now,
            exp: now + self.expire_secs as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("failed to encode JWT: {}", e)))
    }

    pub fn decode_headers(&self, headers: &HeaderMap) -> Result<Claims, ServiceError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".into()))?;

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))
    }
}

impl Authenticator for JwtAuthenticator {
    fn check(&self, headers: &HeaderMap, permission: &str) -> Result<(), ServiceError> {
        let claims = self.decode_headers(headers)?;
        if !claims.role.can_sign_in() {
            return Err(ServiceError::PermissionDenied(format!(
                "{} {} lacks permission {}",
                claims.role, claims.sub, permission
            )));
        }
        debug!("{} {} granted {}", claims.role, claims.sub, permission);
        Ok(())
    }
}
