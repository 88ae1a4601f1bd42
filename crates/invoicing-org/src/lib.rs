//! # Invoicing Organization Model
//!
//! This crate provides the multi-tenant data model for the invoicing API.
//!
//! ## Overview
//!
//! The invoicing-org crate handles:
//! - **Organizations**: Tenant entities with a settings document
//! - **Users**: Accounts with a current-organization preference
//! - **Memberships**: User-organization-role bindings
//! - **Roles**: Stored permission bundles
//! - **Subscriptions**: Plans, status, billing period and usage limits
//! - **Context**: The pure permission decision for one user in one organization
//! - **Records**: Clients and invoices, the ownable resources
//!
//! ## Architecture
//!
//! ```text
//! User
//!   └─ UserOrganizationRole ─→ Organization
//!        │                        ├─ Settings
//!        │                        ├─ Subscription (plan limits)
//!        │                        ├─ Clients
//!        │                        └─ Invoices
//!        └─ Role (PermissionSet)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use invoicing_org::{Organization, Role, Subscription, SubscriptionPlan, User,
//!     UserOrganizationRole, UserPermissionContext};
//! use invoicing_rbac::{Action, ResourceType, SystemRole};
//!
//! let user = User::new("ada@example.com", "Ada", "Lovelace");
//! let org = Organization::new("Ada Lovelace's Organization", "org-ada");
//! let role = Role::system(SystemRole::OrgUser);
//! let binding = UserOrganizationRole::new(user.id, org.id, role.id);
//!
//! let ctx = UserPermissionContext::new(user.id, binding.organization_id).with_role(role);
//! assert!(ctx.can_perform_action(ResourceType::Invoices, Action::Create));
//!
//! let sub = Subscription::new(org.id, SubscriptionPlan::Free);
//! assert!(sub.can_create_invoices(4));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod context;
pub mod membership;
pub mod organization;
pub mod records;
pub mod roles;
pub mod settings;
pub mod subscription;
pub mod user;

// Re-export main types for convenience
pub use context::UserPermissionContext;
pub use membership::{earliest_membership, UserOrganizationRole};
pub use organization::Organization;
pub use records::{Client, Invoice, InvoiceStatus, Ownable};
pub use roles::Role;
pub use settings::OrganizationSettings;
pub use subscription::{
    check_limit, LimitedResource, PlanLimits, Subscription, SubscriptionPlan,
    SubscriptionStatus, UsageLimit, UsagePeriod,
};
pub use user::User;
