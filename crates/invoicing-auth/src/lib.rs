//! # Invoicing Authorization
//!
//! This crate provides request authorization for the multi-tenant invoicing
//! API.
//!
//! ## Overview
//!
//! The invoicing-auth crate handles:
//! - **Identity**: Bearer parsing and JWT validation
//! - **Organization resolution**: Header, query, path, then the caller's default
//! - **Permissions**: Role grants with the `own_` ownership override
//! - **Entitlements**: Subscription gate and plan usage limits
//! - **Provisioning**: System role seeding, personal organizations, invitations
//!
//! ## Features
//!
//! - `jwt` (default): JWT access tokens using jsonwebtoken
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use invoicing_auth::{AccessRequest, Authorizer, AuthConfig, InMemoryStore, JwtService,
//!     OrganizationHints};
//! use invoicing_org::User;
//! use invoicing_rbac::{Action, ResourceType};
//!
//! # async fn example() -> invoicing_auth::AuthResult<()> {
//! let config = AuthConfig::from_env();
//! let jwt = Arc::new(JwtService::new(&config)?);
//! let store = Arc::new(InMemoryStore::new());
//! let authorizer = Authorizer::new(store, jwt.clone()).with_config(config);
//!
//! // Registration
//! let user = User::new("ada@example.com", "Ada", "Lovelace");
//! let provisioned = authorizer.provision_personal_organization(user).await?;
//! let token = jwt.generate_access_token(provisioned.user.id, &provisioned.user.email)?;
//!
//! // Per request
//! let ctx = authorizer
//!     .authorize_request(
//!         AccessRequest::new(ResourceType::Invoices, Action::Create)
//!             .with_bearer(&token)
//!             .with_hints(OrganizationHints::new()),
//!     )
//!     .await?;
//! assert_eq!(ctx.organization_id, provisioned.organization.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Fail-closed defaults
//!
//! - A missing role, membership or subscription denies
//! - Unknown resource, action or role names deny
//! - Ownership only unlocks grants listed under `own_<resource>`

pub mod claims;
pub mod config;
pub mod context;
pub mod entitlements;
pub mod error;
pub mod guard;
pub mod identity;
#[cfg(feature = "jwt")]
pub mod jwt;
pub mod memory;
pub mod provisioning;
pub mod resolver;
pub mod store;

// Re-export main types
pub use claims::AccessClaims;
pub use config::{AuthConfig, ConfigError, JwtAlgorithm};
pub use context::RequestContext;
pub use entitlements::{check_subscription_active, check_usage_limit, enforce_usage_limit};
pub use error::{AuthError, AuthResult};
pub use guard::{AccessRequest, Authorizer};
pub use identity::{parse_bearer, IdentityResolver};
pub use memory::InMemoryStore;
pub use provisioning::{ensure_system_role, provision_personal_organization, ProvisionedOrganization};
pub use resolver::{resolve_organization, OrganizationHints};
pub use store::{
    AuthStore, MembershipStore, OrganizationStore, OwnershipLookup, RoleStore, SubscriptionStore,
    UsageCounter, UserStore,
};

#[cfg(feature = "jwt")]
pub use jwt::JwtService;
