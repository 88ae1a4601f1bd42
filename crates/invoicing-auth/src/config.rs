//! Authorization configuration.
//!
//! Provides token signing settings and the names under which a request may
//! carry an organization hint. Configuration is loaded from environment
//! variables with defaults for local development.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AuthError;

/// Signing secret used when none is configured. Rejected in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-secret-do-not-use-in-production";

/// Minimum accepted secret length in production, in bytes.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        AuthError::Config(err.to_string())
    }
}

/// HMAC algorithms accepted for access tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    #[default]
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl JwtAlgorithm {
    /// Parse from the header name, e.g. `HS256`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HS256" => Some(JwtAlgorithm::HS256),
            "HS384" => Some(JwtAlgorithm::HS384),
            "HS512" => Some(JwtAlgorithm::HS512),
            _ => None,
        }
    }
}

/// Authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,

    /// Signing algorithm.
    pub jwt_algorithm: JwtAlgorithm,

    /// Token issuer.
    pub jwt_issuer: String,

    /// Token audience.
    pub jwt_audience: String,

    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: i64,

    /// Request header carrying the organization hint.
    pub organization_header: String,

    /// Query parameter carrying the organization hint.
    pub organization_query_param: String,

    /// Path parameter carrying the organization hint.
    pub organization_path_param: String,
}

impl Default for AuthConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            jwt_secret: Some(DEVELOPMENT_JWT_SECRET.to_string()),
            jwt_algorithm: JwtAlgorithm::HS256,
            jwt_issuer: "invoicing-api".to_string(),
            jwt_audience: "invoicing".to_string(),
            access_token_ttl_secs: 24 * 60 * 60,
            organization_header: "X-Organization-ID".to_string(),
            organization_query_param: "organization_id".to_string(),
            organization_path_param: "organization_id".to_string(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `JWT_SECRET`: HMAC signing secret (default: development secret)
    /// - `JWT_ALGORITHM`: `HS256`, `HS384` or `HS512` (default: HS256)
    /// - `JWT_ISSUER`: Token issuer (default: invoicing-api)
    /// - `JWT_AUDIENCE`: Token audience (default: invoicing)
    /// - `ACCESS_TOKEN_TTL_SECS`: Access token lifetime (default: 86400)
    /// - `ORGANIZATION_HEADER`: Hint header name (default: X-Organization-ID)
    /// - `ORGANIZATION_QUERY_PARAM`: Hint query parameter (default: organization_id)
    /// - `ORGANIZATION_PATH_PARAM`: Hint path parameter (default: organization_id)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            jwt_secret: std::env::var("JWT_SECRET").ok().or(default.jwt_secret),
            jwt_algorithm: std::env::var("JWT_ALGORITHM")
                .ok()
                .and_then(|s| JwtAlgorithm::parse(&s))
                .unwrap_or(default.jwt_algorithm),
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or(default.jwt_issuer),
            jwt_audience: std::env::var("JWT_AUDIENCE").unwrap_or(default.jwt_audience),
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.access_token_ttl_secs),
            organization_header: std::env::var("ORGANIZATION_HEADER")
                .unwrap_or(default.organization_header),
            organization_query_param: std::env::var("ORGANIZATION_QUERY_PARAM")
                .unwrap_or(default.organization_query_param),
            organization_path_param: std::env::var("ORGANIZATION_PATH_PARAM")
                .unwrap_or(default.organization_path_param),
        }
    }

    /// Set the signing secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    /// Access token lifetime.
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl_secs)
    }

    /// Validate that the configuration is safe for production.
    ///
    /// The secret must be set, must not be the development default and must
    /// be at least [`MIN_PRODUCTION_SECRET_LEN`] bytes.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        let secret = self
            .jwt_secret
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        if secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::InvalidValue {
                key: "JWT_SECRET".to_string(),
                message: "development secret must not be used in production".to_string(),
            });
        }
        if secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                key: "JWT_SECRET".to_string(),
                message: format!("must be at least {} bytes", MIN_PRODUCTION_SECRET_LEN),
            });
        }
        if self.access_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_TTL_SECS".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
