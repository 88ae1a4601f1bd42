//! Ownable tenant records
//!
//! Only the fields authorization reads are modelled here: who created the
//! row, which organization it belongs to, and when it was created.

use chrono::{DateTime, Utc};
use invoicing_rbac::ResourceType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A record created by a user inside an organization.
pub trait Ownable {
    /// Resource type used for permission checks
    const RESOURCE: ResourceType;

    fn id(&self) -> Uuid;

    /// The creating user
    fn owner_id(&self) -> Uuid;

    fn organization_id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    /// Check whether `user_id` created this record.
    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}

/// A customer billed by the organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,

    /// Creating user
    pub user_id: Uuid,

    pub organization_id: Uuid,

    pub name: String,

    pub email: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(
        organization_id: Uuid,
        user_id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            organization_id,
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Ownable for Client {
    const RESOURCE: ResourceType = ResourceType::Clients;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Invoice status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// An invoice issued to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,

    /// Creating user
    pub user_id: Uuid,

    pub organization_id: Uuid,

    pub client_id: Uuid,

    pub invoice_number: String,

    #[serde(default)]
    pub status: InvoiceStatus,

    /// Counts toward the monthly invoice limit of the month it falls in
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        organization_id: Uuid,
        user_id: Uuid,
        client_id: Uuid,
        invoice_number: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            organization_id,
            client_id,
            invoice_number: invoice_number.into(),
            status: InvoiceStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Override the creation time.
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }
}

impl Ownable for Invoice {
    const RESOURCE: ResourceType = ResourceType::Invoices;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
