//! Stored roles
//!
//! A [`Role`] is reference data shared by every membership that points at
//! it. System roles are seeded from [`SystemRole`] bundles; custom roles
//! carry whatever grants an administrator gave them.

use chrono::{DateTime, Utc};
use invoicing_rbac::{Action, PermissionSet, ResourceType, SystemRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named permission bundle.
///
/// # Examples
///
/// ```
/// use invoicing_org::Role;
/// use invoicing_rbac::{Action, ResourceType, SystemRole};
///
/// let role = Role::system(SystemRole::OrgViewer);
/// assert!(role.is_system_role);
/// assert!(role.has_permission(ResourceType::Invoices, Action::Read));
/// assert!(!role.has_permission(ResourceType::Invoices, Action::Update));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier
    pub id: Uuid,

    /// Unique role name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Granted permissions
    #[serde(default)]
    pub permissions: PermissionSet,

    /// Whether this role was seeded by the system
    #[serde(default)]
    pub is_system_role: bool,

    /// When the role was created
    pub created_at: DateTime<Utc>,

    /// When the role was last updated
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Build the seed row for a system role.
    pub fn system(role: SystemRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: role.as_str().to_string(),
            description: role.description().to_string(),
            permissions: role.default_permissions(),
            is_system_role: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a custom (non-system) role.
    pub fn custom(
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: PermissionSet,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: description.into(),
            permissions,
            is_system_role: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether this role grants `action` on `resource`.
    pub fn has_permission(&self, resource: ResourceType, action: Action) -> bool {
        self.permissions.has(resource, action)
    }

    /// Wire-level form of [`has_permission`](Self::has_permission).
    ///
    /// Unknown names deny.
    pub fn has_permission_str(&self, resource: &str, action: &str) -> bool {
        self.permissions.has_str(resource, action)
    }

    /// The system role this row represents, if its name is one.
    pub fn system_role(&self) -> Option<SystemRole> {
        SystemRole::parse(&self.name)
    }

    /// Exact name comparison.
    pub fn is(&self, role: SystemRole) -> bool {
        self.name == role.as_str()
    }

    /// Exact name match against an allow-list of role names.
    ///
    /// Accepts [`SystemRole`] values or plain names, so custom roles can be
    /// listed too. There is no hierarchy between roles.
    pub fn is_any<N: AsRef<str>>(&self, allowed: &[N]) -> bool {
        allowed.iter().any(|name| self.name == name.as_ref())
    }

    /// The decision rule shared by every permission check.
    ///
    /// A direct grant allows. Failing that, an owner is allowed when the
    /// `own_` bucket for the resource grants the action. Non-owners never
    /// consult that bucket.
    pub fn authorize(&self, resource: ResourceType, action: Action, is_owner: bool) -> bool {
        if self.has_permission(resource, action) {
            return true;
        }
        is_owner
            && resource
                .owned_variant()
                .is_some_and(|own| self.has_permission(own, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_role_seed() {
        let role = Role::system(SystemRole::OrgAdmin);
        assert_eq!(role.name, "org_admin");
        assert_eq!(role.description, "Organization Administrator");
        assert!(role.is_system_role);
        assert_eq!(role.system_role(), Some(SystemRole::OrgAdmin));
        assert!(role.is(SystemRole::OrgAdmin));
        assert!(!role.is(SystemRole::PlatformAdmin));
    }

    #[test]
    fn test_custom_role() {
        let perms = PermissionSet::new().with(ResourceType::Clients, &[Action::Read]);
        let role = Role::custom("auditor", "Read-only client auditor", perms);

        assert!(!role.is_system_role);
        assert_eq!(role.system_role(), None);
        assert!(role.has_permission_str("clients", "read"));
        assert!(!role.has_permission_str("invoices", "read"));
    }

    #[test]
    fn test_authorize_ownership_override() {
        let user = Role::system(SystemRole::OrgUser);
        assert!(user.authorize(ResourceType::Invoices, Action::Update, false));
        assert!(!user.authorize(ResourceType::Invoices, Action::Delete, false));
        assert!(user.authorize(ResourceType::Invoices, Action::Delete, true));
        assert!(user.authorize(ResourceType::Clients, Action::Delete, true));
        // No own_ bucket exists for users
        assert!(!user.authorize(ResourceType::Users, Action::Delete, true));

        let viewer = Role::system(SystemRole::OrgViewer);
        assert!(!viewer.authorize(ResourceType::Invoices, Action::Delete, true));
    }

    #[test]
    fn test_is_any_matches_custom_names() {
        let approver = Role::custom("approver", "Approves invoices", PermissionSet::new());
        assert!(approver.is_any(&["approver", "org_admin"]));
        assert!(!approver.is_any(&[SystemRole::OrgAdmin, SystemRole::OrgUser]));
        assert!(!approver.is_any::<&str>(&[]));

        let admin = Role::system(SystemRole::OrgAdmin);
        assert!(admin.is_any(&[SystemRole::OrgAdmin]));
        assert!(admin.is_any(&["org_admin"]));
        assert!(!admin.is_any(&["ORG_ADMIN", "admin"]));
    }

    #[test]
    fn test_unknown_resource_string_denies() {
        let role = Role::system(SystemRole::PlatformAdmin);
        assert!(!role.has_permission_str("payments", "manage"));
        assert!(!role.has_permission_str("organizations", "approve"));
        assert!(role.has_permission_str("organizations", "delete"));
    }

    #[test]
    fn test_role_deserializes_stored_row() {
        let json = serde_json::json!({
            "id": "0190a5c2-0000-7000-8000-000000000001",
            "name": "org_user",
            "description": "Organization User",
            "permissions": {
                "invoices": ["create", "read", "update"],
                "own_invoices": ["delete"]
            },
            "is_system_role": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });

        let role: Role = serde_json::from_value(json).unwrap();
        assert!(role.has_permission(ResourceType::OwnInvoices, Action::Delete));
        assert!(!role.has_permission(ResourceType::Invoices, Action::Delete));
    }
}
