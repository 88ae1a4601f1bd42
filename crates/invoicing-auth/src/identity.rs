//! Caller identity
//!
//! Turns an `Authorization` header into a user id. The token format is
//! pluggable through [`IdentityResolver`]; [`JwtService`](crate::JwtService)
//! is the stock implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Resolves a bearer token to the calling user's id.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Validate `token` and return its subject.
    ///
    /// Fails with [`AuthError::InvalidCredential`] or
    /// [`AuthError::TokenExpired`].
    async fn resolve_identity(&self, token: &str) -> AuthResult<Uuid>;
}

/// Extract the token from an `Authorization` header value.
///
/// The value must start with `Bearer ` and carry a non-empty token.
///
/// # Examples
///
/// ```
/// use invoicing_auth::parse_bearer;
///
/// assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
/// assert!(parse_bearer(Some("Basic dXNlcjpwYXNz")).is_err());
/// assert!(parse_bearer(None).is_err());
/// ```
pub fn parse_bearer(header: Option<&str>) -> AuthResult<&str> {
    let header = header.ok_or_else(|| {
        AuthError::InvalidCredential("Authorization header required".to_string())
    })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::InvalidCredential("Invalid authorization header format".to_string())
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidCredential("Empty bearer token".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header() {
        let err = parse_bearer(None).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_wrong_scheme() {
        assert!(matches!(
            parse_bearer(Some("Token abc")),
            Err(AuthError::InvalidCredential(_))
        ));
        // Scheme is case sensitive
        assert!(parse_bearer(Some("bearer abc")).is_err());
        // Bare token without scheme
        assert!(parse_bearer(Some("abc")).is_err());
    }

    #[test]
    fn test_empty_token() {
        assert!(parse_bearer(Some("Bearer ")).is_err());
        assert!(parse_bearer(Some("Bearer    ")).is_err());
    }
}
