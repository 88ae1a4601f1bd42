//! In-memory store
//!
//! Implements every storage trait over process memory. Suitable for tests
//! and single-process tools; production deployments back the traits with a
//! database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use invoicing_org::{
    Client, Invoice, LimitedResource, Organization, Ownable, Role, Subscription, User,
    UserOrganizationRole, UsagePeriod,
};
use invoicing_rbac::ResourceType;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::store::{
    MembershipStore, OrganizationStore, OwnershipLookup, RoleStore, SubscriptionStore,
    UsageCounter, UserStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    memberships: Vec<UserOrganizationRole>,
    roles: HashMap<Uuid, Role>,
    subscriptions: HashMap<Uuid, Subscription>,
    clients: HashMap<Uuid, Client>,
    invoices: HashMap<Uuid, Invoice>,
}

/// In-memory implementation of every store trait.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a client.
    pub async fn insert_client(&self, client: Client) {
        self.state.write().await.clients.insert(client.id, client);
    }

    /// Remove a client. Returns whether it existed.
    pub async fn delete_client(&self, client_id: Uuid) -> bool {
        self.state.write().await.clients.remove(&client_id).is_some()
    }

    /// Insert an invoice.
    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.state.write().await.invoices.insert(invoice.id, invoice);
    }

    /// Remove an invoice. Returns whether it existed.
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> bool {
        self.state.write().await.invoices.remove(&invoice_id).is_some()
    }
}

fn owner_in<R: Ownable>(records: &HashMap<Uuid, R>, organization_id: Uuid, id: Uuid) -> Option<Uuid> {
    records
        .get(&id)
        .filter(|r| r.organization_id() == organization_id)
        .map(|r| r.owner_id())
}

fn count_in<R: Ownable>(records: &HashMap<Uuid, R>, organization_id: Uuid, period: UsagePeriod) -> u64 {
    records
        .values()
        .filter(|r| r.organization_id() == organization_id && period.contains(r.created_at()))
        .count() as u64
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn save_user(&self, user: User) -> AuthResult<()> {
        self.state.write().await.users.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_organization(&self, organization_id: Uuid) -> AuthResult<Option<Organization>> {
        Ok(self.state.read().await.organizations.get(&organization_id).cloned())
    }

    async fn insert_organization(&self, organization: Organization) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.organizations.contains_key(&organization.id) {
            return Err(AuthError::Conflict(format!(
                "organization {} already exists",
                organization.id
            )));
        }
        if state
            .organizations
            .values()
            .any(|o| o.subdomain == organization.subdomain)
        {
            return Err(AuthError::Conflict(format!(
                "subdomain {} is taken",
                organization.subdomain
            )));
        }
        state.organizations.insert(organization.id, organization);
        Ok(())
    }

    async fn delete_organization(&self, organization_id: Uuid) -> AuthResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .organizations
            .remove(&organization_id)
            .is_some())
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> AuthResult<Option<UserOrganizationRole>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .iter()
            .find(|m| m.user_id == user_id && m.organization_id == organization_id)
            .cloned())
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> AuthResult<Vec<UserOrganizationRole>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_membership(&self, membership: UserOrganizationRole) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state
            .memberships
            .iter()
            .any(|m| m.user_id == membership.user_id && m.organization_id == membership.organization_id)
        {
            return Err(AuthError::Conflict(
                "user already belongs to this organization".to_string(),
            ));
        }
        state.memberships.push(membership);
        Ok(())
    }

    async fn delete_membership(&self, user_id: Uuid, organization_id: Uuid) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|m| !(m.user_id == user_id && m.organization_id == organization_id));
        Ok(state.memberships.len() != before)
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn find_role(&self, role_id: Uuid) -> AuthResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AuthResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn insert_role(&self, role: Role) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|r| r.name == role.name) {
            return Err(AuthError::Conflict(format!("role {} already exists", role.name)));
        }
        state.roles.insert(role.id, role);
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn find_subscription(&self, organization_id: Uuid) -> AuthResult<Option<Subscription>> {
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .get(&organization_id)
            .cloned())
    }

    async fn save_subscription(&self, subscription: Subscription) -> AuthResult<()> {
        self.state
            .write()
            .await
            .subscriptions
            .insert(subscription.organization_id, subscription);
        Ok(())
    }

    async fn delete_subscription(&self, organization_id: Uuid) -> AuthResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .subscriptions
            .remove(&organization_id)
            .is_some())
    }
}

#[async_trait]
impl OwnershipLookup for InMemoryStore {
    async fn owner_of(
        &self,
        organization_id: Uuid,
        resource: ResourceType,
        resource_id: Uuid,
    ) -> AuthResult<Option<Uuid>> {
        let state = self.state.read().await;
        Ok(match resource {
            ResourceType::Invoices | ResourceType::OwnInvoices => {
                owner_in(&state.invoices, organization_id, resource_id)
            }
            ResourceType::Clients | ResourceType::OwnClients => {
                owner_in(&state.clients, organization_id, resource_id)
            }
            _ => None,
        })
    }
}

#[async_trait]
impl UsageCounter for InMemoryStore {
    async fn count_usage(
        &self,
        organization_id: Uuid,
        resource: LimitedResource,
        period: UsagePeriod,
    ) -> AuthResult<u64> {
        let state = self.state.read().await;
        Ok(match resource {
            LimitedResource::Invoices => count_in(&state.invoices, organization_id, period),
            LimitedResource::Clients => count_in(&state.clients, organization_id, period),
            LimitedResource::Users => state
                .memberships
                .iter()
                .filter(|m| m.organization_id == organization_id && period.contains(m.assigned_at))
                .count() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use invoicing_org::SubscriptionPlan;
    use invoicing_rbac::SystemRole;

    #[tokio::test]
    async fn test_membership_uniqueness() {
        let store = InMemoryStore::new();
        let (user, org, role) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());

        store
            .insert_membership(UserOrganizationRole::new(user, org, role))
            .await
            .unwrap();
        let err = store
            .insert_membership(UserOrganizationRole::new(user, org, Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));

        assert!(store.find_membership(user, org).await.unwrap().is_some());
        assert!(store.find_membership(user, Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deletes_report_whether_row_existed() {
        let store = InMemoryStore::new();
        let org = Organization::new("Acme", "acme");
        let (org_id, user) = (org.id, Uuid::now_v7());
        store.insert_organization(org).await.unwrap();
        store
            .insert_membership(UserOrganizationRole::new(user, org_id, Uuid::now_v7()))
            .await
            .unwrap();
        store
            .save_subscription(Subscription::new(org_id, SubscriptionPlan::Free))
            .await
            .unwrap();

        assert!(store.delete_membership(user, org_id).await.unwrap());
        assert!(store.delete_subscription(org_id).await.unwrap());
        assert!(store.delete_organization(org_id).await.unwrap());

        assert!(!store.delete_membership(user, org_id).await.unwrap());
        assert!(!store.delete_subscription(org_id).await.unwrap());
        assert!(!store.delete_organization(org_id).await.unwrap());

        // Subdomain is free again
        store.insert_organization(Organization::new("Acme", "acme")).await.unwrap();
    }

    #[tokio::test]
    async fn test_role_name_uniqueness() {
        let store = InMemoryStore::new();
        store.insert_role(Role::system(SystemRole::OrgAdmin)).await.unwrap();
        let err = store
            .insert_role(Role::system(SystemRole::OrgAdmin))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
        assert!(store.find_role_by_name("org_admin").await.unwrap().is_some());
        assert!(store.find_role_by_name("org_user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subdomain_uniqueness() {
        let store = InMemoryStore::new();
        store.insert_organization(Organization::new("A", "acme")).await.unwrap();
        let err = store
            .insert_organization(Organization::new("B", "acme"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ownership_is_organization_scoped() {
        let store = InMemoryStore::new();
        let (org, other_org, author) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let invoice = Invoice::new(org, author, Uuid::now_v7(), "INV-1");
        let invoice_id = invoice.id;
        store.insert_invoice(invoice).await;

        assert_eq!(
            store.owner_of(org, ResourceType::Invoices, invoice_id).await.unwrap(),
            Some(author)
        );
        assert_eq!(
            store.owner_of(other_org, ResourceType::Invoices, invoice_id).await.unwrap(),
            None
        );
        // Wrong table
        assert_eq!(
            store.owner_of(org, ResourceType::Clients, invoice_id).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_invoice_count_is_monthly() {
        let store = InMemoryStore::new();
        let (org, author) = (Uuid::now_v7(), Uuid::now_v7());
        let jan = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap();

        for _ in 0..3 {
            store
                .insert_invoice(Invoice::new(org, author, Uuid::now_v7(), "x").with_created_at(jan))
                .await;
        }
        store
            .insert_invoice(Invoice::new(org, author, Uuid::now_v7(), "y").with_created_at(feb))
            .await;
        store
            .insert_invoice(Invoice::new(Uuid::now_v7(), author, Uuid::now_v7(), "z").with_created_at(feb))
            .await;

        let count = |at: chrono::DateTime<Utc>| {
            let store = store.clone();
            async move {
                store
                    .count_usage(org, LimitedResource::Invoices, UsagePeriod::month_of(at))
                    .await
                    .unwrap()
            }
        };
        assert_eq!(count(jan).await, 3);
        assert_eq!(count(feb).await, 1);
        assert_eq!(
            store
                .count_usage(org, LimitedResource::Invoices, UsagePeriod::AllTime)
                .await
                .unwrap(),
            4
        );
    }

    #[tokio::test]
    async fn test_user_count_uses_memberships() {
        let store = InMemoryStore::new();
        let org = Uuid::now_v7();
        let role = Uuid::now_v7();
        for _ in 0..2 {
            store
                .insert_membership(UserOrganizationRole::new(Uuid::now_v7(), org, role))
                .await
                .unwrap();
        }
        store
            .insert_membership(UserOrganizationRole::new(Uuid::now_v7(), Uuid::now_v7(), role))
            .await
            .unwrap();

        let users = store
            .count_usage(org, LimitedResource::Users, UsagePeriod::AllTime)
            .await
            .unwrap();
        assert_eq!(users, 2);
    }

    #[tokio::test]
    async fn test_subscription_is_keyed_by_organization() {
        let store = InMemoryStore::new();
        let org = Uuid::now_v7();
        store
            .save_subscription(Subscription::new(org, SubscriptionPlan::Free))
            .await
            .unwrap();
        store
            .save_subscription(Subscription::new(org, SubscriptionPlan::Pro))
            .await
            .unwrap();

        let sub = store.find_subscription(org).await.unwrap().unwrap();
        assert_eq!(sub.plan_type, SubscriptionPlan::Pro);
    }
}
