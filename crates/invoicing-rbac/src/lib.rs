//! # Invoicing RBAC (Role-Based Access Control)
//!
//! This crate provides the permission vocabulary for the invoicing API.
//!
//! ## Overview
//!
//! The invoicing-rbac crate handles:
//! - **Resources**: The closed set of resource types, including the `own_` buckets
//! - **Actions**: `create`, `read`, `update`, `delete` and the `manage` wildcard
//! - **Permissions**: Resource + Action combinations
//! - **Permission Sets**: Typed resource → actions maps held by roles
//! - **System Roles**: Built-in roles and their default grants
//!
//! ## Architecture
//!
//! ```text
//! Permission = Resource + Action
//!
//! Examples:
//!   "invoices:read"         - Read any invoice in the organization
//!   "own_invoices:delete"   - Delete invoices the caller created
//!   "users:manage"          - Every action on users
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use invoicing_rbac::{Action, PermissionSet, ResourceType, SystemRole};
//!
//! let viewer = SystemRole::OrgViewer.default_permissions();
//! assert!(viewer.has(ResourceType::Invoices, Action::Read));
//! assert!(!viewer.has(ResourceType::Invoices, Action::Delete));
//!
//! let mut custom = PermissionSet::new();
//! custom.grant(ResourceType::Clients, Action::Manage);
//! assert!(custom.has_str("clients", "delete"));
//! assert!(!custom.has_str("unknown", "read"));
//! ```
//!
//! ## Fail-closed defaults
//!
//! - Resources absent from a set deny every action
//! - Unknown resource, action or role names deny
//! - `manage` is the only implied action

pub mod actions;
pub mod permissions;
pub mod resources;
pub mod roles;

// Re-export main types for convenience
pub use actions::Action;
pub use permissions::{Permission, PermissionSet};
pub use resources::ResourceType;
pub use roles::{default_permissions, SystemRole};
