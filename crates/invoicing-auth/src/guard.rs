//! Request authorization pipeline
//!
//! [`Authorizer`] ties identity, organization resolution, the subscription
//! gate, permission evaluation and usage limits together. Each step is also
//! callable on its own for handlers that need finer control.
//!
//! # Order
//!
//! ```text
//! bearer → identity → organization → subscription → permission → limit
//! ```
//!
//! The first unmet precondition stops the request.

use std::sync::Arc;

use chrono::Utc;
use invoicing_org::{LimitedResource, Subscription};
use invoicing_rbac::{Action, ResourceType};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::entitlements;
use crate::error::{AuthError, AuthResult};
use crate::identity::{parse_bearer, IdentityResolver};
use crate::resolver::{self, OrganizationHints};
use crate::store::{AuthStore, OwnershipLookup};

/// Everything needed to authorize one request.
///
/// # Examples
///
/// ```
/// use invoicing_auth::{AccessRequest, OrganizationHints};
/// use invoicing_rbac::{Action, ResourceType};
/// use uuid::Uuid;
///
/// let invoice_id = Uuid::now_v7();
/// let request = AccessRequest::new(ResourceType::Invoices, Action::Delete)
///     .with_authorization("Bearer eyJ...")
///     .with_hints(OrganizationHints::new().with_header(Uuid::now_v7().to_string()))
///     .on_resource(invoice_id);
/// assert_eq!(request.resource_id, Some(invoice_id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Raw `Authorization` header value
    #[serde(skip_serializing)]
    pub authorization: Option<String>,

    /// Organization hints
    #[serde(default)]
    pub hints: OrganizationHints,

    /// Resource being acted on
    pub resource: ResourceType,

    /// Action requested
    pub action: Action,

    /// Target row, for ownership-aware checks
    #[serde(default)]
    pub resource_id: Option<Uuid>,
}

impl AccessRequest {
    /// Request for `action` on `resource` with no credential or hints yet.
    pub fn new(resource: ResourceType, action: Action) -> Self {
        Self {
            authorization: None,
            hints: OrganizationHints::default(),
            resource,
            action,
            resource_id: None,
        }
    }

    /// Set the raw `Authorization` header value.
    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }

    /// Set the header to `Bearer <token>`.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_authorization(format!("Bearer {}", token))
    }

    pub fn with_hints(mut self, hints: OrganizationHints) -> Self {
        self.hints = hints;
        self
    }

    /// Target a specific row.
    pub fn on_resource(mut self, resource_id: Uuid) -> Self {
        self.resource_id = Some(resource_id);
        self
    }
}

/// Authorization service over a store and an identity resolver.
#[derive(Clone)]
pub struct Authorizer {
    pub(crate) store: Arc<dyn AuthStore>,
    identity: Arc<dyn IdentityResolver>,
    config: AuthConfig,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("organization_header", &self.config.organization_header)
            .finish()
    }
}

impl Authorizer {
    /// Create an authorizer with default configuration.
    pub fn new(store: Arc<dyn AuthStore>, identity: Arc<dyn IdentityResolver>) -> Self {
        Self {
            store,
            identity,
            config: AuthConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Collect organization hints under this authorizer's configured names.
    pub fn extract_hints<H, Q, P>(&self, header: H, query: Q, path: P) -> OrganizationHints
    where
        H: Fn(&str) -> Option<String>,
        Q: Fn(&str) -> Option<String>,
        P: Fn(&str) -> Option<String>,
    {
        OrganizationHints::extract(&self.config, header, query, path)
    }

    /// Resolve the caller from an `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthResult<Uuid> {
        let token = parse_bearer(authorization)?;
        self.identity.resolve_identity(token).await
    }

    /// Resolve the organization the caller acts on.
    pub async fn resolve_organization(
        &self,
        user_id: Uuid,
        hints: &OrganizationHints,
    ) -> AuthResult<RequestContext> {
        resolver::resolve_organization(&*self.store, user_id, hints).await
    }

    /// Gate on an active, unexpired subscription.
    pub async fn check_subscription_active(&self, organization_id: Uuid) -> AuthResult<Subscription> {
        entitlements::check_subscription_active(&*self.store, organization_id, Utc::now()).await
    }

    /// Pure permission decision.
    pub fn authorize(
        &self,
        ctx: &RequestContext,
        resource: ResourceType,
        action: Action,
        is_owner: bool,
    ) -> bool {
        ctx.authorize(resource, action, is_owner)
    }

    /// Require a direct grant, ignoring ownership.
    pub fn require_permission(
        &self,
        ctx: &RequestContext,
        resource: ResourceType,
        action: Action,
    ) -> AuthResult<()> {
        if ctx.authorize(resource, action, false) {
            debug!(role = %ctx.role.name, %resource, %action, "Permission granted");
            return Ok(());
        }
        Err(deny(ctx, resource, action))
    }

    /// Require a direct grant, or the `own_` grant when the caller created
    /// `resource_id`.
    ///
    /// Ownership is only looked up when the role lacks the direct grant. A
    /// row that does not exist in the organization is denied the same way as
    /// one owned by someone else.
    pub async fn require_ownership_or_permission(
        &self,
        ctx: &RequestContext,
        resource: ResourceType,
        action: Action,
        resource_id: Uuid,
    ) -> AuthResult<()> {
        if ctx.authorize(resource, action, false) {
            debug!(role = %ctx.role.name, %resource, %action, "Permission granted");
            return Ok(());
        }

        // Nothing to gain from a lookup if the own_ bucket cannot grant it
        if !ctx.authorize(resource, action, true) {
            return Err(deny(ctx, resource, action));
        }

        let owner = self
            .store
            .owner_of(ctx.organization_id, resource, resource_id)
            .await?;

        match owner {
            Some(owner) if owner == ctx.user_id => {
                debug!(%resource, %action, %resource_id, "Permission granted via ownership");
                Ok(())
            }
            _ => Err(deny(ctx, resource, action)),
        }
    }

    /// Require one of the listed roles by exact name.
    ///
    /// `allowed` may hold [`SystemRole`](invoicing_rbac::SystemRole)s or plain
    /// role names.
    pub fn require_role<N: AsRef<str>>(&self, ctx: &RequestContext, allowed: &[N]) -> AuthResult<()> {
        if ctx.has_any_role(allowed) {
            return Ok(());
        }
        warn!(
            user_id = %ctx.user_id,
            organization_id = %ctx.organization_id,
            role = %ctx.role.name,
            "Role not permitted"
        );
        Err(AuthError::AccessDenied(format!(
            "role {} is not permitted",
            ctx.role.name
        )))
    }

    /// Check whether the organization may create one more `resource`.
    pub async fn check_usage_limit(
        &self,
        resource: LimitedResource,
        subscription: &Subscription,
        organization_id: Uuid,
    ) -> AuthResult<bool> {
        entitlements::check_usage_limit(&*self.store, resource, subscription, organization_id, Utc::now())
            .await
    }

    /// Fail with `LimitReached` unless one more `resource` may be created.
    pub async fn enforce_usage_limit(
        &self,
        resource: LimitedResource,
        subscription: &Subscription,
        organization_id: Uuid,
    ) -> AuthResult<()> {
        entitlements::enforce_usage_limit(&*self.store, resource, subscription, organization_id, Utc::now())
            .await
    }

    /// Run the whole pipeline for one request.
    ///
    /// Returns the request context with the subscription attached.
    #[instrument(
        skip_all,
        fields(resource = %request.resource, action = %request.action)
    )]
    pub async fn authorize_request(&self, request: AccessRequest) -> AuthResult<RequestContext> {
        let user_id = self.authenticate(request.authorization.as_deref()).await?;

        let ctx = self.resolve_organization(user_id, &request.hints).await?;

        let subscription = self.check_subscription_active(ctx.organization_id).await?;

        match request.resource_id {
            Some(resource_id) => {
                self.require_ownership_or_permission(&ctx, request.resource, request.action, resource_id)
                    .await?
            }
            None => self.require_permission(&ctx, request.resource, request.action)?,
        }

        if let Some(limited) = entitlements::limited_resource_for(request.resource, request.action) {
            self.enforce_usage_limit(limited, &subscription, ctx.organization_id)
                .await?;
        }

        debug!(
            user_id = %ctx.user_id,
            organization_id = %ctx.organization_id,
            "Request authorized"
        );
        Ok(ctx.with_subscription(subscription))
    }
}

fn deny(ctx: &RequestContext, resource: ResourceType, action: Action) -> AuthError {
    warn!(
        user_id = %ctx.user_id,
        organization_id = %ctx.organization_id,
        role = %ctx.role.name,
        %resource,
        %action,
        "Permission denied"
    );
    AuthError::AccessDenied(format!("{}:{} not permitted", resource, action))
}
