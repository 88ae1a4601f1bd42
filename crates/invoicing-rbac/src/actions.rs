//! # Actions
//!
//! The closed set of operations a role may be granted on a resource.
//! Action names are part of the wire vocabulary and must stay stable.

use serde::{Deserialize, Serialize};

/// Actions that can be granted on a resource.
///
/// - **Create**: Create new instances
/// - **Read**: View instances
/// - **Update**: Modify existing instances
/// - **Delete**: Remove instances
/// - **Manage**: Wildcard covering every action on the resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new resource.
    Create,

    /// Read/view resource.
    Read,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,

    /// Full management of the resource.
    ///
    /// A grant of `manage` satisfies a check for any other action on the
    /// same resource.
    Manage,
}

impl Action {
    /// Get the wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    /// Parse an action from its wire name.
    ///
    /// Only the exact lowercase names are accepted; anything else is `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("read"), Some(Action::Read));
    /// assert_eq!(Action::parse("manage"), Some(Action::Manage));
    /// assert_eq!(Action::parse("view"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Action::Create),
            "read" => Some(Action::Read),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            "manage" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ]
    }

    /// Check if holding this action satisfies a check for `other`.
    ///
    /// Every action implies itself. `Manage` implies all actions. No other
    /// implication exists: `update` does not grant `read`.
    ///
    /// # Example
    ///
    /// ```
    /// use invoicing_rbac::actions::Action;
    ///
    /// assert!(Action::Manage.implies(Action::Delete));
    /// assert!(Action::Read.implies(Action::Read));
    /// assert!(!Action::Update.implies(Action::Read));
    /// ```
    pub fn implies(&self, other: Action) -> bool {
        *self == Action::Manage || *self == other
    }

    /// Check if this action writes data.
    pub fn is_write(&self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::Delete)
    }

    /// Check if this action creates new rows (the only kind subject to usage limits).
    pub fn is_creation(&self) -> bool {
        matches!(self, Action::Create)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
