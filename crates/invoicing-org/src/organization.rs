//! Organization domain models
//!
//! Organizations are the tenant boundary. Clients, invoices, memberships and
//! the subscription all belong to exactly one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::OrganizationSettings;

/// An organization represents a tenant in the multi-tenant system.
///
/// # Architecture
///
/// ```text
/// Organization
///   ├─ Members (via UserOrganizationRole)
///   ├─ Clients
///   ├─ Invoices
///   ├─ Settings
///   └─ Subscription (at most one)
/// ```
///
/// # Examples
///
/// ```
/// use invoicing_org::Organization;
///
/// let org = Organization::new("Acme Corp", "acme");
/// assert_eq!(org.name, "Acme Corp");
/// assert!(!org.settings.is_default);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Unique subdomain
    pub subdomain: String,

    /// Organization-level settings
    #[serde(default)]
    pub settings: OrganizationSettings,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization with default settings.
    pub fn new(name: impl Into<String>, subdomain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            subdomain: subdomain.into(),
            settings: OrganizationSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the settings document.
    pub fn with_settings(mut self, settings: OrganizationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Subdomain for a user's personal organization: `org-` plus the last
    /// eight hex characters of the user id.
    ///
    /// The leading characters of a v7 id are its timestamp and repeat for
    /// every id minted in the same ~65 second window, so the random tail is
    /// used instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use invoicing_org::Organization;
    ///
    /// let id = Uuid::parse_str("0190a5c2-1111-7000-8000-00000a1b2c3d").unwrap();
    /// assert_eq!(Organization::personal_subdomain(id), "org-0a1b2c3d");
    /// ```
    pub fn personal_subdomain(user_id: Uuid) -> String {
        let simple = user_id.simple().to_string();
        format!("org-{}", &simple[simple.len() - 8..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_creation() {
        let org = Organization::new("Acme Corp", "acme-corp");
        assert_eq!(org.name, "Acme Corp");
        assert_eq!(org.subdomain, "acme-corp");
        assert_eq!(org.created_at, org.updated_at);
    }

    #[test]
    fn test_personal_subdomain_uses_id_suffix() {
        let id = Uuid::now_v7();
        let subdomain = Organization::personal_subdomain(id);
        assert_eq!(subdomain.len(), "org-".len() + 8);
        assert!(id.simple().to_string().ends_with(&subdomain["org-".len()..]));
    }

    #[test]
    fn test_personal_subdomains_differ_for_ids_minted_together() {
        let ids: Vec<Uuid> = (0..64).map(|_| Uuid::now_v7()).collect();
        let mut subdomains: Vec<String> =
            ids.iter().map(|id| Organization::personal_subdomain(*id)).collect();
        subdomains.sort();
        subdomains.dedup();
        assert_eq!(subdomains.len(), ids.len());
    }

    #[test]
    fn test_missing_settings_default() {
        let json = serde_json::json!({
            "id": Uuid::now_v7(),
            "name": "Acme",
            "subdomain": "acme",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let org: Organization = serde_json::from_value(json).unwrap();
        assert!(!org.settings.is_default);
    }
}
