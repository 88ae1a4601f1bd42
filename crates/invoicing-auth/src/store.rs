//! Storage collaborators
//!
//! The authorization core reads tenant data through these traits and never
//! touches a database directly. Every method is organization-scoped where a
//! tenant boundary applies. Failures surface as [`AuthError::Store`] and are
//! propagated unchanged.
//!
//! [`AuthError::Store`]: crate::AuthError::Store

use async_trait::async_trait;
use invoicing_org::{
    LimitedResource, Organization, Role, Subscription, User, UserOrganizationRole, UsagePeriod,
};
use invoicing_rbac::ResourceType;
use uuid::Uuid;

use crate::error::AuthResult;

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by ID.
    async fn find_user(&self, user_id: Uuid) -> AuthResult<Option<User>>;

    /// Insert or replace a user.
    async fn save_user(&self, user: User) -> AuthResult<()>;
}

/// Organizations.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Get an organization by ID.
    async fn find_organization(&self, organization_id: Uuid) -> AuthResult<Option<Organization>>;

    /// Insert a new organization.
    ///
    /// Fails with `Conflict` if the id or subdomain is taken.
    async fn insert_organization(&self, organization: Organization) -> AuthResult<()>;

    /// Remove an organization. Returns whether it existed.
    async fn delete_organization(&self, organization_id: Uuid) -> AuthResult<bool>;
}

/// User-organization-role bindings.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// The binding for (user, organization), if any.
    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> AuthResult<Option<UserOrganizationRole>>;

    /// Every binding held by a user, in no particular order.
    async fn list_memberships_for_user(&self, user_id: Uuid) -> AuthResult<Vec<UserOrganizationRole>>;

    /// Insert a binding.
    ///
    /// Fails with `Conflict` if the user already belongs to the organization.
    async fn insert_membership(&self, membership: UserOrganizationRole) -> AuthResult<()>;

    /// Remove the binding for (user, organization). Returns whether it existed.
    async fn delete_membership(&self, user_id: Uuid, organization_id: Uuid) -> AuthResult<bool>;
}

/// Stored roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Get a role by ID.
    async fn find_role(&self, role_id: Uuid) -> AuthResult<Option<Role>>;

    /// Get a role by its unique name.
    async fn find_role_by_name(&self, name: &str) -> AuthResult<Option<Role>>;

    /// Insert a role.
    ///
    /// Fails with `Conflict` if the name is taken.
    async fn insert_role(&self, role: Role) -> AuthResult<()>;
}

/// Organization subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The organization's subscription, if any.
    async fn find_subscription(&self, organization_id: Uuid) -> AuthResult<Option<Subscription>>;

    /// Insert or replace the organization's subscription.
    async fn save_subscription(&self, subscription: Subscription) -> AuthResult<()>;

    /// Remove the organization's subscription. Returns whether it existed.
    async fn delete_subscription(&self, organization_id: Uuid) -> AuthResult<bool>;
}

/// Creator lookup for ownable records.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// The user who created `resource_id` within `organization_id`.
    ///
    /// Returns `None` when no such row exists in that organization. Rows in
    /// other organizations are never visible.
    async fn owner_of(
        &self,
        organization_id: Uuid,
        resource: ResourceType,
        resource_id: Uuid,
    ) -> AuthResult<Option<Uuid>>;
}

/// Usage counts for limited resources.
#[async_trait]
pub trait UsageCounter: Send + Sync {
    /// Number of `resource` rows in `organization_id` falling in `period`.
    async fn count_usage(
        &self,
        organization_id: Uuid,
        resource: LimitedResource,
        period: UsagePeriod,
    ) -> AuthResult<u64>;
}

/// Everything the authorization pipeline reads.
pub trait AuthStore:
    UserStore
    + OrganizationStore
    + MembershipStore
    + RoleStore
    + SubscriptionStore
    + OwnershipLookup
    + UsageCounter
{
}

impl<T> AuthStore for T where
    T: UserStore
        + OrganizationStore
        + MembershipStore
        + RoleStore
        + SubscriptionStore
        + OwnershipLookup
        + UsageCounter
{
}
