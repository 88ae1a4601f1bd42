//! Access token claims
//!
//! The subject is the only claim authorization depends on. Organization
//! selection happens per request and is deliberately not baked into tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token.
///
/// # Example
///
/// ```rust
/// use invoicing_auth::claims::AccessClaims;
/// use uuid::Uuid;
///
/// let user_id = Uuid::now_v7();
/// let claims = AccessClaims::new(user_id, "ada@example.com", chrono::Duration::hours(1));
/// assert_eq!(claims.user_id(), Some(user_id));
/// assert!(!claims.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    // Standard JWT claims (RFC 7519)
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID
    pub jti: String,

    /// User email
    pub email: String,
}

impl AccessClaims {
    /// Create claims valid from now for `duration`.
    pub fn new(user_id: Uuid, email: impl Into<String>, duration: chrono::Duration) -> Self {
        let now = Utc::now();
        let exp = now + duration;

        Self {
            sub: user_id.to_string(),
            iss: "invoicing-api".to_string(),
            aud: "invoicing".to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            email: email.into(),
        }
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = issuer.into();
        self
    }

    /// Set the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = audience.into();
        self
    }

    /// Get the user ID as UUID.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_subject() {
        let user_id = Uuid::now_v7();
        let claims = AccessClaims::new(user_id, "a@example.com", chrono::Duration::minutes(5));
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.user_id(), Some(user_id));
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn test_non_uuid_subject() {
        let mut claims = AccessClaims::new(Uuid::now_v7(), "a@example.com", chrono::Duration::minutes(5));
        claims.sub = "admin".to_string();
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn test_expired_claims() {
        let claims = AccessClaims::new(Uuid::now_v7(), "a@example.com", chrono::Duration::seconds(-10));
        assert!(claims.is_expired());
    }
}
