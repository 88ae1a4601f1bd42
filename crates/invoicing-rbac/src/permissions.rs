//! # Permissions
//!
//! Core permission types for the RBAC model. A role's grants are held in a
//! [`PermissionSet`], a typed mapping from resource to the actions allowed
//! on it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::actions::Action;
use crate::resources::ResourceType;

/// A single resource + action pair.
///
/// # Example
///
/// ```
/// use invoicing_rbac::permissions::Permission;
/// use invoicing_rbac::resources::ResourceType;
/// use invoicing_rbac::actions::Action;
///
/// let perm = Permission::new(ResourceType::Invoices, Action::Read);
/// assert_eq!(perm.to_string(), "invoices:read");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permission {
    /// The resource type this permission applies to.
    pub resource: ResourceType,
    /// The action allowed on the resource.
    pub action: Action,
}

impl Permission {
    /// Create a new permission.
    pub fn new(resource: ResourceType, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parse from the `resource:action` form.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::permissions::Permission;
    /// use invoicing_rbac::resources::ResourceType;
    /// use invoicing_rbac::actions::Action;
    ///
    /// let perm = Permission::from_string("own_invoices:delete").unwrap();
    /// assert_eq!(perm.resource, ResourceType::OwnInvoices);
    /// assert_eq!(perm.action, Action::Delete);
    ///
    /// assert!(Permission::from_string("invoices").is_none());
    /// assert!(Permission::from_string("invoices:read:extra").is_none());
    /// ```
    pub fn from_string(s: &str) -> Option<Self> {
        let (resource, action) = s.split_once(':')?;
        if action.contains(':') {
            return None;
        }
        Some(Self {
            resource: ResourceType::parse(resource)?,
            action: Action::parse(action)?,
        })
    }

    /// Check if holding this permission satisfies a check for `other`.
    pub fn matches(&self, other: &Permission) -> bool {
        self.resource == other.resource && self.action.implies(other.action)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

/// The permissions granted to a role.
///
/// Serializes as a JSON object keyed by resource wire name, e.g.
/// `{"invoices": ["create", "read"], "own_invoices": ["delete"]}`.
/// Unknown resource or action names are rejected when deserializing, so a
/// set in memory only ever holds the closed vocabulary.
///
/// # Example
///
/// ```
/// use invoicing_rbac::{Action, PermissionSet, ResourceType};
///
/// let set = PermissionSet::new()
///     .with(ResourceType::Invoices, &[Action::Read])
///     .with(ResourceType::Clients, &[Action::Manage]);
///
/// assert!(set.has(ResourceType::Invoices, Action::Read));
/// assert!(!set.has(ResourceType::Invoices, Action::Delete));
/// assert!(set.has(ResourceType::Clients, Action::Delete)); // manage covers delete
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    grants: BTreeMap<ResourceType, BTreeSet<Action>>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            grants: BTreeMap::new(),
        }
    }

    /// Builder form of [`grant_all`](Self::grant_all).
    pub fn with(mut self, resource: ResourceType, actions: &[Action]) -> Self {
        self.grant_all(resource, actions.iter().copied());
        self
    }

    /// Grant a single action on a resource.
    pub fn grant(&mut self, resource: ResourceType, action: Action) {
        self.grants.entry(resource).or_default().insert(action);
    }

    /// Grant several actions on a resource.
    pub fn grant_all<I>(&mut self, resource: ResourceType, actions: I)
    where
        I: IntoIterator<Item = Action>,
    {
        let entry = self.grants.entry(resource).or_default();
        entry.extend(actions);
    }

    /// Remove a granted action.
    ///
    /// Only removes the exact action; revoking `read` from a set holding
    /// `manage` leaves `manage` in place.
    ///
    /// # Returns
    ///
    /// `true` if the action was present, `false` otherwise
    pub fn revoke(&mut self, resource: ResourceType, action: Action) -> bool {
        let Some(actions) = self.grants.get_mut(&resource) else {
            return false;
        };
        let removed = actions.remove(&action);
        if actions.is_empty() {
            self.grants.remove(&resource);
        }
        removed
    }

    /// Check whether `action` is allowed on `resource`.
    ///
    /// True if the resource's action set contains `action` or `manage`.
    /// Resources with no entry deny everything.
    pub fn has(&self, resource: ResourceType, action: Action) -> bool {
        self.grants
            .get(&resource)
            .is_some_and(|actions| actions.iter().any(|granted| granted.implies(action)))
    }

    /// Check a [`Permission`] value.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.has(permission.resource, permission.action)
    }

    /// Check using wire-level names.
    ///
    /// Unknown resource or action names always return `false`.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::{Action, PermissionSet, ResourceType};
    ///
    /// let set = PermissionSet::new().with(ResourceType::Invoices, &[Action::Manage]);
    /// assert!(set.has_str("invoices", "delete"));
    /// assert!(!set.has_str("invoices", "approve"));
    /// assert!(!set.has_str("payments", "read"));
    /// ```
    pub fn has_str(&self, resource: &str, action: &str) -> bool {
        match (ResourceType::parse(resource), Action::parse(action)) {
            (Some(resource), Some(action)) => self.has(resource, action),
            _ => false,
        }
    }

    /// The actions granted on a resource, if any.
    pub fn actions_for(&self, resource: ResourceType) -> Option<&BTreeSet<Action>> {
        self.grants.get(&resource)
    }

    /// Iterate over every granted permission in resource order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.grants.iter().flat_map(|(resource, actions)| {
            actions
                .iter()
                .map(move |action| Permission::new(*resource, *action))
        })
    }

    /// Resources with at least one granted action.
    pub fn resources(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.grants
            .iter()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(resource, _)| *resource)
    }

    /// Merge another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        for (resource, actions) in &other.grants {
            self.grant_all(*resource, actions.iter().copied());
        }
    }

    /// Create from `resource:action` strings, skipping any that don't parse.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::PermissionSet;
    ///
    /// let set = PermissionSet::from_strings(&["invoices:read", "clients:create", "bogus:read"]);
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn from_strings(perms: &[&str]) -> Self {
        perms
            .iter()
            .filter_map(|s| Permission::from_string(s))
            .collect()
    }

    /// Number of granted (resource, action) pairs.
    pub fn len(&self) -> usize {
        self.grants.values().map(BTreeSet::len).sum()
    }

    /// Check if nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this set satisfies every permission in `other`.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.iter().all(|perm| self.has_permission(&perm))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        for perm in iter {
            set.grant(perm.resource, perm.action);
        }
        set
    }
}
