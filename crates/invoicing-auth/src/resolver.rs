//! Organization resolution
//!
//! Determines which organization a request acts on and verifies the caller
//! belongs to it.
//!
//! # Precedence
//!
//! ```text
//! 1. header hint      (X-Organization-ID)
//! 2. query hint       (?organization_id=)
//! 3. path hint        (/organizations/{organization_id}/...)
//! 4. user.current_organization_id
//! 5. earliest membership by assigned_at, then organization id
//! ```
//!
//! Whichever source wins, the caller must hold a membership for exactly
//! that organization. Hints are never trusted on their own.

use invoicing_org::{earliest_membership, UserOrganizationRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::error::{AuthError, AuthResult};
use crate::store::{MembershipStore, RoleStore, UserStore};

/// Raw organization hints as received on the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationHints {
    /// Header value
    pub header: Option<String>,

    /// Query parameter value
    pub query: Option<String>,

    /// Path parameter value
    pub path: Option<String>,
}

impl OrganizationHints {
    /// No hints.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, value: impl Into<String>) -> Self {
        self.header = Some(value.into());
        self
    }

    pub fn with_query(mut self, value: impl Into<String>) -> Self {
        self.query = Some(value.into());
        self
    }

    pub fn with_path(mut self, value: impl Into<String>) -> Self {
        self.path = Some(value.into());
        self
    }

    /// Collect hints using the configured header and parameter names.
    ///
    /// Each lookup receives the name to read and returns its raw value.
    /// Header lookups should be case-insensitive, as HTTP header maps are.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use invoicing_auth::{AuthConfig, OrganizationHints};
    ///
    /// let config = AuthConfig::default();
    /// let query = HashMap::from([("organization_id", "q")]);
    ///
    /// let hints = OrganizationHints::extract(
    ///     &config,
    ///     |_| None,
    ///     |name| query.get(name).map(|v| v.to_string()),
    ///     |_| None,
    /// );
    /// assert_eq!(hints.explicit(), Some("q"));
    /// ```
    pub fn extract<H, Q, P>(config: &AuthConfig, header: H, query: Q, path: P) -> Self
    where
        H: Fn(&str) -> Option<String>,
        Q: Fn(&str) -> Option<String>,
        P: Fn(&str) -> Option<String>,
    {
        Self {
            header: header(&config.organization_header),
            query: query(&config.organization_query_param),
            path: path(&config.organization_path_param),
        }
    }

    /// The winning explicit hint, trimmed. Blank values count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use invoicing_auth::OrganizationHints;
    ///
    /// let hints = OrganizationHints::new().with_header("  ").with_query("q").with_path("p");
    /// assert_eq!(hints.explicit(), Some("q"));
    /// ```
    pub fn explicit(&self) -> Option<&str> {
        [&self.header, &self.query, &self.path]
            .into_iter()
            .filter_map(|hint| hint.as_deref())
            .map(str::trim)
            .find(|hint| !hint.is_empty())
    }
}

/// Resolve the request's organization and build its context.
///
/// Fails with:
/// - `NotFound("user")` if the caller's user row does not exist
/// - `AccessDenied` for a malformed hint or a missing membership
/// - `NoOrganizationContext` if no source yields an organization
/// - `NotFound("role")` if the membership points at a missing role
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn resolve_organization<S>(
    store: &S,
    user_id: Uuid,
    hints: &OrganizationHints,
) -> AuthResult<RequestContext>
where
    S: UserStore + MembershipStore + RoleStore + ?Sized,
{
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("user".to_string()))?;

    let membership = match hints.explicit() {
        Some(raw) => {
            let organization_id = Uuid::parse_str(raw).map_err(|_| {
                warn!(hint = %raw, "Malformed organization hint");
                AuthError::AccessDenied("invalid organization id".to_string())
            })?;
            require_membership(store, user_id, organization_id).await?
        }
        None => match user.current_organization_id {
            Some(organization_id) => require_membership(store, user_id, organization_id).await?,
            None => {
                let memberships = store.list_memberships_for_user(user_id).await?;
                earliest_membership(&memberships)
                    .cloned()
                    .ok_or(AuthError::NoOrganizationContext)?
            }
        },
    };

    let role = store
        .find_role(membership.role_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("role".to_string()))?;

    debug!(
        organization_id = %membership.organization_id,
        role = %role.name,
        "Resolved organization context"
    );

    Ok(RequestContext::new(membership, role))
}

async fn require_membership<S>(
    store: &S,
    user_id: Uuid,
    organization_id: Uuid,
) -> AuthResult<UserOrganizationRole>
where
    S: MembershipStore + ?Sized,
{
    store
        .find_membership(user_id, organization_id)
        .await?
        .ok_or_else(|| {
            warn!(
                user_id = %user_id,
                organization_id = %organization_id,
                "Caller is not a member of organization"
            );
            AuthError::AccessDenied("not a member of this organization".to_string())
        })
}
