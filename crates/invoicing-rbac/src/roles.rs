//! System roles and their default grants
//!
//! The four system roles are seeded into storage on first use. Their grants
//! live here so every seeding path produces the same bundle.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::permissions::PermissionSet;
use crate::resources::ResourceType;

/// Built-in roles.
///
/// Roles are flat: no role inherits from another. A gate that should admit
/// both admins must list both.
///
/// # Examples
///
/// ```
/// use invoicing_rbac::{Action, ResourceType, SystemRole};
///
/// let perms = SystemRole::OrgUser.default_permissions();
/// assert!(perms.has(ResourceType::OwnInvoices, Action::Delete));
/// assert!(!perms.has(ResourceType::Invoices, Action::Delete));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Operator of the whole platform
    PlatformAdmin,

    /// Administrator of one organization
    OrgAdmin,

    /// Regular member who creates and edits content
    OrgUser,

    /// Read-only member
    OrgViewer,
}

impl SystemRole {
    /// Get the stored role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformAdmin => "platform_admin",
            Self::OrgAdmin => "org_admin",
            Self::OrgUser => "org_user",
            Self::OrgViewer => "org_viewer",
        }
    }

    /// Parse from the stored role name (exact match).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "platform_admin" => Some(Self::PlatformAdmin),
            "org_admin" => Some(Self::OrgAdmin),
            "org_user" => Some(Self::OrgUser),
            "org_viewer" => Some(Self::OrgViewer),
            _ => None,
        }
    }

    /// Get all system roles.
    pub fn all() -> Vec<Self> {
        vec![
            Self::PlatformAdmin,
            Self::OrgAdmin,
            Self::OrgUser,
            Self::OrgViewer,
        ]
    }

    /// Description stored on the seeded role row.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PlatformAdmin => "Platform Administrator",
            Self::OrgAdmin => "Organization Administrator",
            Self::OrgUser => "Organization User",
            Self::OrgViewer => "Organization Viewer",
        }
    }

    /// The permission bundle granted to this role when it is seeded.
    pub fn default_permissions(&self) -> PermissionSet {
        use Action::{Create, Delete, Manage, Read, Update};
        use ResourceType::*;

        match self {
            Self::PlatformAdmin => PermissionSet::new()
                .with(Organizations, &[Manage])
                .with(Users, &[Manage])
                .with(Subscriptions, &[Manage])
                .with(Invoices, &[Read, Update, Delete])
                .with(Clients, &[Read, Update, Delete]),
            Self::OrgAdmin => PermissionSet::new()
                .with(Organization, &[Read, Update])
                .with(Users, &[Manage])
                .with(Invoices, &[Manage])
                .with(Clients, &[Manage])
                .with(Subscription, &[Read, Update]),
            Self::OrgUser => PermissionSet::new()
                .with(Invoices, &[Create, Read, Update])
                .with(Clients, &[Create, Read, Update])
                .with(OwnInvoices, &[Delete])
                .with(OwnClients, &[Delete]),
            Self::OrgViewer => PermissionSet::new()
                .with(Invoices, &[Read])
                .with(Clients, &[Read]),
        }
    }
}

impl std::fmt::Display for SystemRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SystemRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Default permissions for a role name.
///
/// Unknown names get an empty set.
///
/// # Examples
///
/// ```
/// use invoicing_rbac::default_permissions;
///
/// assert!(!default_permissions("org_admin").is_empty());
/// assert!(default_permissions("superuser").is_empty());
/// ```
pub fn default_permissions(role_name: &str) -> PermissionSet {
    SystemRole::parse(role_name)
        .map(|role| role.default_permissions())
        .unwrap_or_default()
}
