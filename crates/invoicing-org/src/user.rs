//! User accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account.
///
/// Users belong to organizations through
/// [`UserOrganizationRole`](crate::UserOrganizationRole) bindings.
/// Credentials live elsewhere; this is the profile the authorization core
/// reads.
///
/// # Examples
///
/// ```
/// use invoicing_org::User;
///
/// let user = User::new("ada@example.com", "Ada", "Lovelace");
/// assert_eq!(user.full_name(), "Ada Lovelace");
/// assert!(user.current_organization_id.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,

    /// Unique email address
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    #[serde(default)]
    pub company_name: Option<String>,

    /// IANA timezone name
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Organization selected when a request carries no hint
    #[serde(default)]
    pub current_organization_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl User {
    /// Creates a new user with no current organization.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            company_name: None,
            timezone: default_timezone(),
            current_organization_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the current organization.
    pub fn with_current_organization(mut self, organization_id: Uuid) -> Self {
        self.current_organization_id = Some(organization_id);
        self
    }

    /// `first last`
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Make `organization_id` the default for hint-less requests.
    pub fn switch_organization(&mut self, organization_id: Uuid) {
        self.current_organization_id = Some(organization_id);
        self.updated_at = Utc::now();
    }
}
