//! Role seeding, organization provisioning and member invitation
//!
//! These are the only paths in this crate that write tenant data. They run
//! at registration time or behind an administrative permission check.

use invoicing_org::{
    LimitedResource, Organization, OrganizationSettings, Role, Subscription, SubscriptionPlan,
    User, UserOrganizationRole,
};
use invoicing_rbac::{Action, ResourceType, SystemRole};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{AuthError, AuthResult};
use crate::guard::Authorizer;
use crate::store::{
    AuthStore, MembershipStore, OrganizationStore, RoleStore, SubscriptionStore, UserStore,
};

/// Return the stored system role, inserting its seed row on first use.
pub async fn ensure_system_role<S>(store: &S, role: SystemRole) -> AuthResult<Role>
where
    S: RoleStore + ?Sized,
{
    if let Some(existing) = store.find_role_by_name(role.as_str()).await? {
        return Ok(existing);
    }

    let seeded = Role::system(role);
    match store.insert_role(seeded.clone()).await {
        Ok(()) => {
            info!(role = %role, role_id = %seeded.id, "Seeded system role");
            Ok(seeded)
        }
        // Another caller seeded it between our read and write
        Err(AuthError::Conflict(_)) => store
            .find_role_by_name(role.as_str())
            .await?
            .ok_or_else(|| AuthError::NotFound("role".to_string())),
        Err(err) => Err(err),
    }
}

/// Records created by [`provision_personal_organization`].
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedOrganization {
    /// The user, now pointing at the new organization
    pub user: User,

    pub organization: Organization,

    /// The user's `org_admin` binding
    pub membership: UserOrganizationRole,

    pub role: Role,

    /// Active free-plan subscription
    pub subscription: Subscription,
}

/// Create a user's personal organization.
///
/// The organization is named `"{first} {last}'s Organization"` with the
/// subdomain `org-<last 8 hex chars of user id>`. The user becomes its
/// `org_admin`, it starts on an active free subscription, and it becomes the
/// user's current organization.
///
/// The writes are not transactional. If any write after the organization
/// insert fails, the membership, subscription and organization are deleted
/// again before the original error is returned. A failure during that
/// cleanup is logged and can leave rows behind.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn provision_personal_organization<S>(
    store: &S,
    mut user: User,
) -> AuthResult<ProvisionedOrganization>
where
    S: AuthStore + ?Sized,
{
    let role = ensure_system_role(store, SystemRole::OrgAdmin).await?;

    let organization = Organization::new(
        format!("{}'s Organization", user.full_name()),
        Organization::personal_subdomain(user.id),
    )
    .with_settings(OrganizationSettings::personal());
    store.insert_organization(organization.clone()).await?;

    let (membership, subscription) =
        match populate_organization(store, &mut user, &organization, &role).await {
            Ok(rows) => rows,
            Err(err) => {
                rollback_organization(store, user.id, organization.id).await;
                return Err(err);
            }
        };

    info!(
        organization_id = %organization.id,
        subdomain = %organization.subdomain,
        "Provisioned personal organization"
    );

    Ok(ProvisionedOrganization {
        user,
        organization,
        membership,
        role,
        subscription,
    })
}

async fn populate_organization<S>(
    store: &S,
    user: &mut User,
    organization: &Organization,
    role: &Role,
) -> AuthResult<(UserOrganizationRole, Subscription)>
where
    S: AuthStore + ?Sized,
{
    let membership = UserOrganizationRole::new(user.id, organization.id, role.id);
    store.insert_membership(membership.clone()).await?;

    let subscription = Subscription::new(organization.id, SubscriptionPlan::Free);
    store.save_subscription(subscription.clone()).await?;

    user.switch_organization(organization.id);
    store.save_user(user.clone()).await?;

    Ok((membership, subscription))
}

/// Best-effort removal of a half-provisioned organization.
async fn rollback_organization<S>(store: &S, user_id: Uuid, organization_id: Uuid)
where
    S: AuthStore + ?Sized,
{
    if let Err(err) = store.delete_subscription(organization_id).await {
        warn!(%organization_id, error = %err, "Failed to remove subscription during rollback");
    }
    if let Err(err) = store.delete_membership(user_id, organization_id).await {
        warn!(%organization_id, error = %err, "Failed to remove membership during rollback");
    }
    if let Err(err) = store.delete_organization(organization_id).await {
        warn!(%organization_id, error = %err, "Failed to remove organization during rollback");
    }
}

impl Authorizer {
    /// Seed a system role through this authorizer's store.
    pub async fn ensure_system_role(&self, role: SystemRole) -> AuthResult<Role> {
        ensure_system_role(&*self.store, role).await
    }

    /// Provision a personal organization through this authorizer's store.
    pub async fn provision_personal_organization(
        &self,
        user: User,
    ) -> AuthResult<ProvisionedOrganization> {
        provision_personal_organization(&*self.store, user).await
    }

    /// Add an existing user to the caller's organization with `role`.
    ///
    /// Checks run in pipeline order: a usable subscription, then
    /// `users:create`, then room under the plan's member limit. The binding
    /// records the caller as assigner.
    #[instrument(skip_all, fields(organization_id = %ctx.organization_id, invitee = %user_id))]
    pub async fn invite_member(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: SystemRole,
    ) -> AuthResult<UserOrganizationRole> {
        let subscription = self.check_subscription_active(ctx.organization_id).await?;

        self.require_permission(ctx, ResourceType::Users, Action::Create)?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(AuthError::NotFound("user".to_string()));
        }

        self.enforce_usage_limit(LimitedResource::Users, &subscription, ctx.organization_id)
            .await?;

        let role = self.ensure_system_role(role).await?;
        let membership = UserOrganizationRole::new(user_id, ctx.organization_id, role.id)
            .with_assigner(ctx.user_id);
        self.store.insert_membership(membership.clone()).await?;

        info!(role = %role.name, "Invited member");
        Ok(membership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::store::{OwnershipLookup, UsageCounter};
    use async_trait::async_trait;
    use invoicing_org::UsagePeriod;

    /// Delegates to an [`InMemoryStore`] but refuses subscription writes.
    struct SubscriptionWritesFail(InMemoryStore);

    #[async_trait]
    impl UserStore for SubscriptionWritesFail {
        async fn find_user(&self, user_id: Uuid) -> AuthResult<Option<User>> {
            self.0.find_user(user_id).await
        }
        async fn save_user(&self, user: User) -> AuthResult<()> {
            self.0.save_user(user).await
        }
    }

    #[async_trait]
    impl OrganizationStore for SubscriptionWritesFail {
        async fn find_organization(&self, id: Uuid) -> AuthResult<Option<Organization>> {
            self.0.find_organization(id).await
        }
        async fn insert_organization(&self, organization: Organization) -> AuthResult<()> {
            self.0.insert_organization(organization).await
        }
        async fn delete_organization(&self, id: Uuid) -> AuthResult<bool> {
            self.0.delete_organization(id).await
        }
    }

    #[async_trait]
    impl MembershipStore for SubscriptionWritesFail {
        async fn find_membership(
            &self,
            user_id: Uuid,
            organization_id: Uuid,
        ) -> AuthResult<Option<UserOrganizationRole>> {
            self.0.find_membership(user_id, organization_id).await
        }
        async fn list_memberships_for_user(&self, user_id: Uuid) -> AuthResult<Vec<UserOrganizationRole>> {
            self.0.list_memberships_for_user(user_id).await
        }
        async fn insert_membership(&self, membership: UserOrganizationRole) -> AuthResult<()> {
            self.0.insert_membership(membership).await
        }
        async fn delete_membership(&self, user_id: Uuid, organization_id: Uuid) -> AuthResult<bool> {
            self.0.delete_membership(user_id, organization_id).await
        }
    }

    #[async_trait]
    impl RoleStore for SubscriptionWritesFail {
        async fn find_role(&self, role_id: Uuid) -> AuthResult<Option<Role>> {
            self.0.find_role(role_id).await
        }
        async fn find_role_by_name(&self, name: &str) -> AuthResult<Option<Role>> {
            self.0.find_role_by_name(name).await
        }
        async fn insert_role(&self, role: Role) -> AuthResult<()> {
            self.0.insert_role(role).await
        }
    }

    #[async_trait]
    impl SubscriptionStore for SubscriptionWritesFail {
        async fn find_subscription(&self, organization_id: Uuid) -> AuthResult<Option<Subscription>> {
            self.0.find_subscription(organization_id).await
        }
        async fn save_subscription(&self, _subscription: Subscription) -> AuthResult<()> {
            Err(AuthError::Store("billing database unavailable".to_string()))
        }
        async fn delete_subscription(&self, organization_id: Uuid) -> AuthResult<bool> {
            self.0.delete_subscription(organization_id).await
        }
    }

    #[async_trait]
    impl OwnershipLookup for SubscriptionWritesFail {
        async fn owner_of(
            &self,
            organization_id: Uuid,
            resource: ResourceType,
            resource_id: Uuid,
        ) -> AuthResult<Option<Uuid>> {
            self.0.owner_of(organization_id, resource, resource_id).await
        }
    }

    #[async_trait]
    impl UsageCounter for SubscriptionWritesFail {
        async fn count_usage(
            &self,
            organization_id: Uuid,
            resource: LimitedResource,
            period: UsagePeriod,
        ) -> AuthResult<u64> {
            self.0.count_usage(organization_id, resource, period).await
        }
    }

    #[tokio::test]
    async fn test_ensure_system_role_is_idempotent() {
        let store = InMemoryStore::new();
        let first = ensure_system_role(&store, SystemRole::OrgUser).await.unwrap();
        let second = ensure_system_role(&store, SystemRole::OrgUser).await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_system_role);
        assert_eq!(first.permissions, SystemRole::OrgUser.default_permissions());
    }

    #[tokio::test]
    async fn test_provision_personal_organization() {
        let store = InMemoryStore::new();
        let user = User::new("ada@example.com", "Ada", "Lovelace");
        let user_id = user.id;

        let provisioned = provision_personal_organization(&store, user).await.unwrap();
        let org = &provisioned.organization;

        assert_eq!(org.name, "Ada Lovelace's Organization");
        assert_eq!(org.subdomain, Organization::personal_subdomain(user_id));
        assert!(org.settings.is_default);
        assert!(provisioned.role.is(SystemRole::OrgAdmin));
        assert_eq!(provisioned.subscription.plan_type, SubscriptionPlan::Free);
        assert!(provisioned.subscription.is_usable_at(chrono::Utc::now()));

        let stored_user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(stored_user.current_organization_id, Some(org.id));
        assert!(store.find_membership(user_id, org.id).await.unwrap().is_some());
        assert!(store.find_subscription(org.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_back_to_back_registrations_get_distinct_subdomains() {
        let store = InMemoryStore::new();
        let first = provision_personal_organization(&store, User::new("a@example.com", "Ann", "A"))
            .await
            .unwrap();
        let second = provision_personal_organization(&store, User::new("b@example.com", "Bob", "B"))
            .await
            .unwrap();

        assert_ne!(first.organization.subdomain, second.organization.subdomain);
        assert_eq!(first.role.id, second.role.id);
    }

    #[tokio::test]
    async fn test_failed_provisioning_removes_partial_rows() {
        let inner = InMemoryStore::new();
        let store = SubscriptionWritesFail(inner.clone());
        let user = User::new("ada@example.com", "Ada", "Lovelace");
        let user_id = user.id;
        let subdomain = Organization::personal_subdomain(user_id);

        let err = provision_personal_organization(&store, user.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));

        assert!(inner.list_memberships_for_user(user_id).await.unwrap().is_empty());
        assert!(inner.find_user(user_id).await.unwrap().is_none());

        // The subdomain was released, so a retry against a healthy store succeeds
        let provisioned = provision_personal_organization(&inner, user).await.unwrap();
        assert_eq!(provisioned.organization.subdomain, subdomain);
    }

    #[tokio::test]
    async fn test_provisioning_twice_conflicts_on_subdomain() {
        let store = InMemoryStore::new();
        let user = User::new("ada@example.com", "Ada", "Lovelace");
        provision_personal_organization(&store, user.clone()).await.unwrap();

        let err = provision_personal_organization(&store, user).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }
}
