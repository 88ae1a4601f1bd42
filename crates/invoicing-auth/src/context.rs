//! Per-request authorization context
//!
//! [`RequestContext`] is produced once by organization resolution and
//! passed explicitly to every later check in the same request.

use invoicing_org::{Role, Subscription, UserOrganizationRole, UserPermissionContext};
use invoicing_rbac::{Action, PermissionSet, ResourceType};
use serde::Serialize;
use uuid::Uuid;

/// Resolved caller, organization, membership and role for one request.
///
/// # Examples
///
/// ```
/// use invoicing_auth::RequestContext;
/// use invoicing_org::{Role, UserOrganizationRole};
/// use invoicing_rbac::{Action, ResourceType, SystemRole};
/// use uuid::Uuid;
///
/// let role = Role::system(SystemRole::OrgViewer);
/// let membership = UserOrganizationRole::new(Uuid::now_v7(), Uuid::now_v7(), role.id);
/// let ctx = RequestContext::new(membership, role);
///
/// assert!(ctx.authorize(ResourceType::Invoices, Action::Read, false));
/// assert!(!ctx.authorize(ResourceType::Invoices, Action::Delete, true));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Caller
    pub user_id: Uuid,

    /// Resolved organization
    pub organization_id: Uuid,

    /// Caller's binding in the organization
    pub membership: UserOrganizationRole,

    /// Role the binding grants
    pub role: Role,

    /// Attached once the subscription gate has passed
    pub subscription: Option<Subscription>,
}

impl RequestContext {
    /// Build a context from a membership and its role.
    pub fn new(membership: UserOrganizationRole, role: Role) -> Self {
        Self {
            user_id: membership.user_id,
            organization_id: membership.organization_id,
            membership,
            role,
            subscription: None,
        }
    }

    /// Attach the organization's subscription.
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// The role's granted permissions.
    pub fn permissions(&self) -> &PermissionSet {
        &self.role.permissions
    }

    /// Permission context for a decision, given whether the caller owns the target.
    pub fn permission_context(&self, is_owner: bool) -> UserPermissionContext {
        UserPermissionContext::new(self.user_id, self.organization_id)
            .with_role(self.role.clone())
            .as_owner(is_owner)
    }

    /// Pure decision: may the caller perform `action` on `resource`?
    pub fn authorize(&self, resource: ResourceType, action: Action, is_owner: bool) -> bool {
        self.role.authorize(resource, action, is_owner)
    }

    /// Exact role name match against an allow-list of role names.
    pub fn has_any_role<N: AsRef<str>>(&self, allowed: &[N]) -> bool {
        self.role.is_any(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoicing_rbac::SystemRole;

    fn ctx(role: SystemRole) -> RequestContext {
        let role = Role::system(role);
        let membership = UserOrganizationRole::new(Uuid::now_v7(), Uuid::now_v7(), role.id);
        RequestContext::new(membership, role)
    }

    #[test]
    fn test_permission_context_carries_role_and_ownership() {
        let ctx = ctx(SystemRole::OrgUser);
        let owner = ctx.permission_context(true);
        assert_eq!(owner.user_id, ctx.user_id);
        assert_eq!(owner.organization_id, ctx.organization_id);
        assert!(owner.can_perform_action(ResourceType::Invoices, Action::Delete));
        assert!(!ctx
            .permission_context(false)
            .can_perform_action(ResourceType::Invoices, Action::Delete));
    }

    #[test]
    fn test_non_owner_never_uses_own_bucket() {
        let ctx = ctx(SystemRole::OrgUser);
        assert!(!ctx.authorize(ResourceType::Invoices, Action::Delete, false));
        assert!(!ctx.authorize(ResourceType::Clients, Action::Delete, false));
        assert!(ctx.authorize(ResourceType::Clients, Action::Delete, true));
    }

    #[test]
    fn test_require_role_is_exact() {
        let ctx = ctx(SystemRole::OrgAdmin);
        assert!(ctx.has_any_role(&[SystemRole::OrgAdmin]));
        // No hierarchy between roles
        assert!(!ctx.has_any_role(&[SystemRole::OrgUser]));
        assert!(!ctx.has_any_role::<&str>(&[]));
    }

    #[test]
    fn test_custom_role_allow_listed_by_name() {
        let role = Role::custom("approver", "Approves invoices", PermissionSet::new());
        let membership = UserOrganizationRole::new(Uuid::now_v7(), Uuid::now_v7(), role.id);
        let ctx = RequestContext::new(membership, role);
        assert!(ctx.has_any_role(&["approver"]));
        assert!(!ctx.has_any_role(&[SystemRole::OrgAdmin]));
    }

    #[test]
    fn test_context_ids_come_from_membership() {
        let ctx = ctx(SystemRole::OrgUser);
        assert_eq!(ctx.user_id, ctx.membership.user_id);
        assert_eq!(ctx.organization_id, ctx.membership.organization_id);
        assert!(ctx.subscription.is_none());
    }
}
