//! JWT authentication: token issuance and validation, password hashing, and
//! the middleware that gates every resource route behind a Bearer token.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::ServiceError;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from a validated token. Inserted into
/// request extensions by [`require_auth`]; every handler scopes its queries
/// by `user_id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub token_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("Unauthenticated".to_string()))
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration_secs),
        }
    }
}

/// Token blacklist entry, kept until the underlying token would have expired
/// anyway.
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Issues and validates tokens. Logout is an in-memory blacklist keyed by
/// token id; entries are pruned as they pass their natural expiry.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn token_expiration_secs(&self) -> u64 {
        self.config.token_expiration.as_secs()
    }

    /// Generate a signed access token for a user.
    pub fn generate_token(
        &self,
        user: &crate::entities::user::Model,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration).map_err(|_| {
                ServiceError::InternalError("invalid token duration".to_string())
            })?;

        let jti: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            jti,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {}", e)))
    }

    /// Validate a token's signature, expiry, issuer and audience, and check
    /// it has not been revoked.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthorized("Token expired".to_string())
            }
            _ => ServiceError::Unauthorized("Invalid token".to_string()),
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(ServiceError::Unauthorized("Token revoked".to_string()));
        }

        Ok(claims)
    }

    /// Revoke a token so it can no longer authenticate requests.
    pub async fn revoke_token(&self, token: &str) -> Result<(), ServiceError> {
        let claims = self.validate_token(token).await?;

        let expiry = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
        let now = Utc::now();

        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.retain(|entry| entry.expiry > now);
        blacklist.push(BlacklistedToken {
            jti: claims.jti,
            expiry,
        });

        debug!("token revoked");
        Ok(())
    }

    async fn is_token_blacklisted(&self, jti: &str) -> bool {
        let now = Utc::now();
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist
            .iter()
            .any(|entry| entry.jti == jti && entry.expiry > now)
    }
}

/// Hash a password with a random salt, producing a `salt$digest` string.
pub fn hash_password(password: &str) -> String {
    let salt: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let digest = hash_with_salt(password, &salt);
    format!("{}${}", salt, digest)
}

/// Verify a password against a stored `salt$digest` string.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => hash_with_salt(password, salt) == digest,
        None => false,
    }
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Middleware that extracts and validates the Bearer token, then makes the
/// authenticated user available to handlers via request extensions.
pub async fn require_auth(
    State(auth): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ServiceError::Unauthorized("Unauthenticated".to_string()))?;

    let claims = auth.validate_token(&token).await?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| ServiceError::Unauthorized("Invalid token".to_string()))?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        name: claims.name,
        email: claims.email,
        token_id: claims.jti,
    });

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "a".repeat(64),
            jwt_issuer: "costbook-api".to_string(),
            jwt_audience: "costbook-clients".to_string(),
            token_expiration: Duration::from_secs(3600),
        })
    }

    fn test_user() -> crate::entities::user::Model {
        crate::entities::user::Model {
            id: 7,
            name: "Ayu".to_string(),
            email: "ayu@example.com".to_string(),
            password_hash: hash_password("secret123"),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn round_trips_claims_through_a_token() {
        let service = test_service();
        let token = service.generate_token(&test_user()).unwrap();
        let claims = service.validate_token(&token).await.unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "ayu@example.com");
    }

    #[tokio::test]
    async fn rejects_a_revoked_token() {
        let service = test_service();
        let token = service.generate_token(&test_user()).unwrap();
        service.revoke_token(&token).await.unwrap();
        assert!(service.validate_token(&token).await.is_err());
    }

    #[tokio::test]
    async fn rejects_a_token_signed_with_another_secret() {
        let issuing = test_service();
        let verifying = AuthService::new(AuthConfig {
            jwt_secret: "b".repeat(64),
            jwt_issuer: "costbook-api".to_string(),
            jwt_audience: "costbook-clients".to_string(),
            token_expiration: Duration::from_secs(3600),
        });
        let token = issuing.generate_token(&test_user()).unwrap();
        assert!(verifying.validate_token(&token).await.is_err());
    }

    #[test]
    fn verifies_a_hashed_password() {
        let stored = hash_password("hunter2!");
        assert!(verify_password("hunter2!", &stored));
        assert!(!verify_password("hunter3!", &stored));
    }
}
