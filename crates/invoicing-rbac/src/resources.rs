//! # Resource Types
//!
//! The closed vocabulary of resources a role can hold permissions for.
//! Plural names address collections across the platform, singular names
//! address the caller's current organization, and the `own_` buckets hold
//! grants that only apply to rows the caller created.

use serde::{Deserialize, Serialize};

/// Resource types that can have permissions assigned.
///
/// | Wire name        | Meaning                                      |
/// |------------------|----------------------------------------------|
/// | `organizations`  | All organizations (platform administration)  |
/// | `users`          | Users / members                              |
/// | `invoices`       | Invoices in the organization                 |
/// | `clients`        | Clients in the organization                  |
/// | `subscriptions`  | All subscriptions (platform administration)  |
/// | `own_invoices`   | Invoices created by the caller               |
/// | `own_clients`    | Clients created by the caller                |
/// | `organization`   | The current organization                     |
/// | `subscription`   | The current organization's subscription      |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Every organization on the platform.
    Organizations,
    /// Users and organization members.
    Users,
    /// Invoices.
    Invoices,
    /// Clients.
    Clients,
    /// Every subscription on the platform.
    Subscriptions,
    /// Invoices owned by the caller.
    OwnInvoices,
    /// Clients owned by the caller.
    OwnClients,
    /// The caller's current organization.
    Organization,
    /// The current organization's subscription.
    Subscription,
}

impl ResourceType {
    /// Get the wire name of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Organizations => "organizations",
            ResourceType::Users => "users",
            ResourceType::Invoices => "invoices",
            ResourceType::Clients => "clients",
            ResourceType::Subscriptions => "subscriptions",
            ResourceType::OwnInvoices => "own_invoices",
            ResourceType::OwnClients => "own_clients",
            ResourceType::Organization => "organization",
            ResourceType::Subscription => "subscription",
        }
    }

    /// Parse a resource type from its wire name.
    ///
    /// The vocabulary is closed: unknown names return `None` so callers
    /// can deny rather than guess.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::parse("invoices"), Some(ResourceType::Invoices));
    /// assert_eq!(ResourceType::parse("own_clients"), Some(ResourceType::OwnClients));
    /// assert_eq!(ResourceType::parse("payments"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "organizations" => Some(ResourceType::Organizations),
            "users" => Some(ResourceType::Users),
            "invoices" => Some(ResourceType::Invoices),
            "clients" => Some(ResourceType::Clients),
            "subscriptions" => Some(ResourceType::Subscriptions),
            "own_invoices" => Some(ResourceType::OwnInvoices),
            "own_clients" => Some(ResourceType::OwnClients),
            "organization" => Some(ResourceType::Organization),
            "subscription" => Some(ResourceType::Subscription),
            _ => None,
        }
    }

    /// Get all resource types.
    pub fn all() -> Vec<Self> {
        vec![
            ResourceType::Organizations,
            ResourceType::Users,
            ResourceType::Invoices,
            ResourceType::Clients,
            ResourceType::Subscriptions,
            ResourceType::OwnInvoices,
            ResourceType::OwnClients,
            ResourceType::Organization,
            ResourceType::Subscription,
        ]
    }

    /// The ownership bucket consulted when the caller owns the target row.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::resources::ResourceType;
    ///
    /// assert_eq!(ResourceType::Invoices.owned_variant(), Some(ResourceType::OwnInvoices));
    /// assert_eq!(ResourceType::Users.owned_variant(), None);
    /// ```
    pub fn owned_variant(&self) -> Option<Self> {
        match self {
            ResourceType::Invoices => Some(ResourceType::OwnInvoices),
            ResourceType::Clients => Some(ResourceType::OwnClients),
            _ => None,
        }
    }

    /// Check if this is one of the `own_` buckets.
    pub fn is_ownership_bucket(&self) -> bool {
        matches!(self, ResourceType::OwnInvoices | ResourceType::OwnClients)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
