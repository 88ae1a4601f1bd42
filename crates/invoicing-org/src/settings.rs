//! Organization settings
//!
//! Settings are stored as a JSON document on the organization row. Every
//! field is optional on the wire so older documents keep deserializing.

use serde::{Deserialize, Serialize};

/// Organization-level settings.
///
/// # Examples
///
/// ```
/// use invoicing_org::settings::OrganizationSettings;
///
/// let settings = OrganizationSettings::default();
/// assert!(!settings.is_default);
/// assert_eq!(settings.invoice_settings.payment_terms_days, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSettings {
    /// The user's personal organization, created at registration
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_default: bool,

    /// Created by a backfill rather than by registration
    #[serde(default, skip_serializing_if = "is_false")]
    pub created_during_migration: bool,

    /// Address printed on invoices
    #[serde(default)]
    pub company_address: CompanyAddress,

    /// Branding
    #[serde(default, rename = "branding_settings")]
    pub branding: BrandingSettings,

    /// Invoice defaults
    #[serde(default)]
    pub invoice_settings: InvoiceSettings,

    /// Notification preferences
    #[serde(default, rename = "notification_settings")]
    pub notifications: NotificationSettings,
}

impl OrganizationSettings {
    /// Settings for a personal organization created at registration.
    pub fn personal() -> Self {
        Self {
            is_default: true,
            ..Self::default()
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Postal address of the organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyAddress {
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Branding applied to rendered invoices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandingSettings {
    /// Logo URL
    #[serde(default)]
    pub logo_url: Option<String>,

    /// Primary color, e.g. `#1a73e8`
    #[serde(default)]
    pub primary_color: Option<String>,

    /// Theme name
    #[serde(default)]
    pub theme: Option<String>,
}

/// Defaults applied to new invoices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSettings {
    /// ISO 4217 currency code
    #[serde(default)]
    pub default_currency: Option<String>,

    /// Tax rate in percent
    #[serde(default)]
    pub default_tax_rate: f64,

    /// Prefix for generated invoice numbers
    #[serde(default)]
    pub invoice_number_prefix: Option<String>,

    /// Net payment terms (0 = due on receipt)
    #[serde(default)]
    pub payment_terms_days: u32,
}

/// Notification preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub slack_integration: bool,
}
