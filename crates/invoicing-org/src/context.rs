//! Permission context for one user in one organization
//!
//! [`UserPermissionContext`] is the pure decision point: given the caller's
//! role and whether they created the target resource, may they perform an
//! action? It performs no I/O. Ownership is resolved by the caller and
//! passed in.

use invoicing_rbac::{Action, ResourceType, SystemRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

/// A user's effective authority inside one organization.
///
/// # Decision rule
///
/// ```text
/// no role                                   → deny
/// role grants (resource, action)            → allow
/// is_owner and role grants (own_resource,
///   action)                                 → allow
/// otherwise                                 → deny
/// ```
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use invoicing_org::{Role, UserPermissionContext};
/// use invoicing_rbac::{Action, ResourceType, SystemRole};
///
/// let ctx = UserPermissionContext::new(Uuid::now_v7(), Uuid::now_v7())
///     .with_role(Role::system(SystemRole::OrgUser))
///     .as_owner(true);
/// assert!(ctx.can_perform_action(ResourceType::Invoices, Action::Delete));
///
/// let other = ctx.clone().as_owner(false);
/// assert!(!other.can_perform_action(ResourceType::Invoices, Action::Delete));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissionContext {
    /// Caller
    pub user_id: Uuid,

    /// Organization the decision applies to
    pub organization_id: Uuid,

    /// Caller's role in the organization, if any
    pub role: Option<Role>,

    /// Whether the caller created the resource being accessed
    #[serde(default)]
    pub is_owner: bool,
}

impl UserPermissionContext {
    /// Context with no role; every check denies until one is attached.
    pub fn new(user_id: Uuid, organization_id: Uuid) -> Self {
        Self {
            user_id,
            organization_id,
            role: None,
            is_owner: false,
        }
    }

    /// Attach the caller's role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set whether the caller owns the target resource.
    pub fn as_owner(mut self, is_owner: bool) -> Self {
        self.is_owner = is_owner;
        self
    }

    /// Decide whether `action` on `resource` is allowed.
    pub fn can_perform_action(&self, resource: ResourceType, action: Action) -> bool {
        self.role
            .as_ref()
            .is_some_and(|role| role.authorize(resource, action, self.is_owner))
    }

    /// String form of [`can_perform_action`](Self::can_perform_action).
    ///
    /// Unknown names deny.
    pub fn can_perform_action_str(&self, resource: &str, action: &str) -> bool {
        match (ResourceType::parse(resource), Action::parse(action)) {
            (Some(resource), Some(action)) => self.can_perform_action(resource, action),
            _ => false,
        }
    }

    /// Allowed if the role name is one of `allowed`.
    pub fn has_any_role<N: AsRef<str>>(&self, allowed: &[N]) -> bool {
        self.role.as_ref().is_some_and(|role| role.is_any(allowed))
    }

    pub fn is_platform_admin(&self) -> bool {
        self.has_any_role(&[SystemRole::PlatformAdmin])
    }

    pub fn is_org_admin(&self) -> bool {
        self.has_any_role(&[SystemRole::OrgAdmin])
    }

    /// Can create and edit content: org users and both admin roles.
    pub fn is_org_user(&self) -> bool {
        self.has_any_role(&[
            SystemRole::OrgUser,
            SystemRole::OrgAdmin,
            SystemRole::PlatformAdmin,
        ])
    }

    /// Can add or manage members.
    pub fn can_manage_users(&self) -> bool {
        self.can_perform_action(ResourceType::Users, Action::Manage)
            || self.can_perform_action(ResourceType::Users, Action::Create)
    }

    /// Can change the organization's subscription.
    pub fn can_manage_subscription(&self) -> bool {
        self.can_perform_action(ResourceType::Subscription, Action::Update)
            || self.can_perform_action(ResourceType::Subscriptions, Action::Manage)
    }
}
