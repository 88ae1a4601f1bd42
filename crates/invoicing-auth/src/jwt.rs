//! JWT token generation and validation
//!
//! This module provides access token operations using the jsonwebtoken
//! crate. Tokens are HMAC-signed (HS256, HS384 or HS512).

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use tracing::debug;
use uuid::Uuid;

use crate::claims::AccessClaims;
use crate::config::{AuthConfig, JwtAlgorithm};
use crate::error::{AuthError, AuthResult};
use crate::identity::IdentityResolver;

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// JWT service for access tokens.
pub struct JwtService {
    algorithm: JwtAlgorithm,
    issuer: String,
    audience: String,
    access_token_duration: chrono::Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a JWT service from configuration.
    ///
    /// Fails with [`AuthError::Config`] when no secret is configured.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let secret = config
            .jwt_secret
            .as_ref()
            .ok_or_else(|| AuthError::Config("Secret required for HMAC".to_string()))?;

        Ok(Self {
            algorithm: config.jwt_algorithm,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_token_duration: config.access_token_ttl(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Create with a simple secret and otherwise default settings (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        Self::new(&AuthConfig::default().with_secret(secret))
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: Uuid, email: impl Into<String>) -> AuthResult<String> {
        let claims = AccessClaims::new(user_id, email, self.access_token_duration)
            .with_issuer(self.issuer.clone())
            .with_audience(self.audience.clone());
        self.encode_claims(&claims)
    }

    /// Generate a token from existing claims.
    pub fn encode_claims(&self, claims: &AccessClaims) -> AuthResult<String> {
        let header = Header::new(self.algorithm.into());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Config(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> AuthResult<AccessClaims> {
        let mut validation = Validation::new(self.algorithm.into());
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data: TokenData<AccessClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidCredential("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidCredential("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidCredential("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidCredential("Invalid audience".to_string())
                }
                _ => AuthError::InvalidCredential(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Signing algorithm in use.
    pub fn algorithm(&self) -> JwtAlgorithm {
        self.algorithm
    }
}

#[async_trait]
impl IdentityResolver for JwtService {
    async fn resolve_identity(&self, token: &str) -> AuthResult<Uuid> {
        let claims = self.validate_token(token)?;
        let user_id = claims.user_id().ok_or_else(|| {
            AuthError::InvalidCredential("Token subject is not a user id".to_string())
        })?;
        debug!(user_id = %user_id, "Resolved caller identity");
        Ok(user_id)
    }
}
