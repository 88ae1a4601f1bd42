//! Error types for authorization operations
//!
//! This module defines every failure the request pipeline can report, from
//! credential validation through usage-limit enforcement.

use invoicing_org::LimitedResource;
use thiserror::Error;

/// Authorization error types.
///
/// Every denial surfaces as one of these variants. Collaborator failures
/// arrive as [`AuthError::Store`] and are never retried here.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bearer credential missing, malformed or rejected
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Bearer token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// No hint was supplied and the caller belongs to no organization
    #[error("No organization context")]
    NoOrganizationContext,

    /// Caller may not perform the requested operation
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Organization has no usable subscription
    #[error("Subscription required: {0}")]
    SubscriptionRequired(String),

    /// Plan limit for a resource has been reached
    #[error("Usage limit reached for {0}")]
    LimitReached(LimitedResource),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write would violate a uniqueness rule
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage collaborator failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected outcomes and are not server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Store(_) | AuthError::Config(_))
    }

    /// Check if this error is a denial of an authenticated caller.
    pub fn is_denial(&self) -> bool {
        self.status_code() == 403
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredential(_) | AuthError::TokenExpired => 401,

            AuthError::NoOrganizationContext
            | AuthError::AccessDenied(_)
            | AuthError::SubscriptionRequired(_)
            | AuthError::LimitReached(_) => 403,

            AuthError::NotFound(_) => 404,
            AuthError::Conflict(_) => 409,

            AuthError::Store(_) | AuthError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredential(_) => "INVALID_CREDENTIAL",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::NoOrganizationContext => "NO_ORGANIZATION_CONTEXT",
            AuthError::AccessDenied(_) => "ACCESS_DENIED",
            AuthError::SubscriptionRequired(_) => "SUBSCRIPTION_REQUIRED",
            AuthError::LimitReached(_) => "LIMIT_REACHED",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::Conflict(_) => "CONFLICT",
            AuthError::Store(_) => "STORE_ERROR",
            AuthError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredential("x".into()).status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::NoOrganizationContext.status_code(), 403);
        assert_eq!(AuthError::AccessDenied("x".into()).status_code(), 403);
        assert_eq!(AuthError::SubscriptionRequired("x".into()).status_code(), 403);
        assert_eq!(
            AuthError::LimitReached(LimitedResource::Invoices).status_code(),
            403
        );
        assert_eq!(AuthError::NotFound("user".into()).status_code(), 404);
        assert_eq!(AuthError::Conflict("x".into()).status_code(), 409);
        assert_eq!(AuthError::Store("x".into()).status_code(), 500);
        assert_eq!(AuthError::Config("x".into()).status_code(), 500);
    }

    #[test]
    fn test_server_errors() {
        assert!(AuthError::Store("db down".into()).is_server_error());
        assert!(AuthError::Config("missing secret".into()).is_server_error());
        assert!(!AuthError::AccessDenied("nope".into()).is_server_error());
        assert!(AuthError::LimitReached(LimitedResource::Clients).is_denial());
        assert!(!AuthError::TokenExpired.is_denial());
    }

    #[test]
    fn test_limit_message_names_resource() {
        let err = AuthError::LimitReached(LimitedResource::Invoices);
        assert_eq!(err.to_string(), "Usage limit reached for invoices");
        assert_eq!(err.error_code(), "LIMIT_REACHED");
    }
}
