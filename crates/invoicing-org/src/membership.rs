//! Membership domain models
//!
//! A [`UserOrganizationRole`] binds one user to one organization with one
//! role. There is at most one binding per (user, organization) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership binding a user to an organization with a role.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use invoicing_org::UserOrganizationRole;
///
/// let admin = Uuid::now_v7();
/// let binding = UserOrganizationRole::new(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7())
///     .with_assigner(admin);
/// assert_eq!(binding.assigned_by, Some(admin));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOrganizationRole {
    /// Unique membership ID
    pub id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Organization ID
    pub organization_id: Uuid,

    /// Role granted within the organization
    pub role_id: Uuid,

    /// Who created this binding (None for self-provisioned)
    #[serde(default)]
    pub assigned_by: Option<Uuid>,

    /// When the role was assigned
    pub assigned_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl UserOrganizationRole {
    /// Creates a binding assigned now.
    pub fn new(user_id: Uuid, organization_id: Uuid, role_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            organization_id,
            role_id,
            assigned_by: None,
            assigned_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set who assigned this binding.
    pub fn with_assigner(mut self, assigner_id: Uuid) -> Self {
        self.assigned_by = Some(assigner_id);
        self
    }

    /// Override the assignment time.
    pub fn with_assigned_at(mut self, at: DateTime<Utc>) -> Self {
        self.assigned_at = at;
        self
    }

    /// Ordering key for picking a default organization: earliest assignment,
    /// then organization id.
    pub fn default_order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.assigned_at, self.organization_id)
    }
}

/// Pick the default binding among a user's memberships.
///
/// Returns the binding with the earliest `assigned_at`; ties go to the
/// smaller organization id.
pub fn earliest_membership(
    memberships: &[UserOrganizationRole],
) -> Option<&UserOrganizationRole> {
    memberships.iter().min_by_key(|m| m.default_order_key())
}
