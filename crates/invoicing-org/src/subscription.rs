//! Subscription plans and usage limits
//!
//! This module defines the plans an organization can subscribe to, the
//! lifecycle status of a subscription, and the per-resource creation limits
//! each plan carries.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan for an organization.
///
/// # Examples
///
/// ```
/// use invoicing_org::{SubscriptionPlan, UsageLimit};
///
/// let limits = SubscriptionPlan::Pro.limits();
/// assert_eq!(limits.invoices_per_month, UsageLimit::Limited(100));
/// assert_eq!(limits.clients, UsageLimit::Unlimited);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// Free plan
    Free,

    /// Paid plan for small teams
    Pro,

    /// Unlimited plan
    Business,
}

impl SubscriptionPlan {
    /// Get the usage limits for this plan.
    pub fn limits(&self) -> PlanLimits {
        match self {
            SubscriptionPlan::Free => PlanLimits {
                invoices_per_month: UsageLimit::Limited(5),
                clients: UsageLimit::Limited(2),
                users: UsageLimit::Limited(1),
            },
            SubscriptionPlan::Pro => PlanLimits {
                invoices_per_month: UsageLimit::Limited(100),
                clients: UsageLimit::Unlimited,
                users: UsageLimit::Limited(5),
            },
            SubscriptionPlan::Business => PlanLimits {
                invoices_per_month: UsageLimit::Unlimited,
                clients: UsageLimit::Unlimited,
                users: UsageLimit::Unlimited,
            },
        }
    }

    /// Limits for a stored plan name; unknown names get the free plan's limits.
    pub fn limits_for_name(s: &str) -> PlanLimits {
        Self::parse(s).unwrap_or_default().limits()
    }

    /// Monthly price in USD.
    pub fn monthly_price_usd(&self) -> f64 {
        match self {
            SubscriptionPlan::Free => 0.0,
            SubscriptionPlan::Pro => 15.0,
            SubscriptionPlan::Business => 50.0,
        }
    }

    /// Parse plan from its stored name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(SubscriptionPlan::Free),
            "pro" => Some(SubscriptionPlan::Pro),
            "business" => Some(SubscriptionPlan::Business),
            _ => None,
        }
    }

    /// Get string representation of the plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Pro => "pro",
            SubscriptionPlan::Business => "business",
        }
    }

    /// Check if this is a paid plan.
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionPlan::Free)
    }
}

impl Default for SubscriptionPlan {
    fn default() -> Self {
        SubscriptionPlan::Free
    }
}

/// Lifecycle status of a subscription.
///
/// Status is maintained by the billing integration and is independent of
/// the billing period: an `active` subscription whose period has ended is
/// still unusable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// In good standing
    Active,

    /// Cancelled by the customer
    Cancelled,

    /// Lapsed
    Expired,

    /// Payment overdue
    PastDue,

    /// Payment failed
    Unpaid,
}

impl SubscriptionStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
        }
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Active
    }
}

/// A creation limit.
///
/// Stored as an integer where `-1` means unlimited. Any other negative value
/// is read as `Limited(0)`, which permits nothing.
///
/// # Examples
///
/// ```
/// use invoicing_org::UsageLimit;
///
/// assert!(UsageLimit::Unlimited.permits(u64::MAX));
/// assert!(UsageLimit::Limited(5).permits(4));
/// assert!(!UsageLimit::Limited(5).permits(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum UsageLimit {
    /// No cap
    Unlimited,

    /// At most this many
    Limited(u32),
}

impl UsageLimit {
    /// Stored sentinel for [`UsageLimit::Unlimited`].
    pub const UNLIMITED_SENTINEL: i64 = -1;

    /// Check whether one more row may be created when `current_count` already exist.
    pub fn permits(&self, current_count: u64) -> bool {
        match self {
            UsageLimit::Unlimited => true,
            UsageLimit::Limited(limit) => current_count < u64::from(*limit),
        }
    }

    /// Check if this is the unlimited sentinel.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, UsageLimit::Unlimited)
    }
}

impl From<i64> for UsageLimit {
    fn from(value: i64) -> Self {
        match value {
            Self::UNLIMITED_SENTINEL => UsageLimit::Unlimited,
            v if v < 0 => UsageLimit::Limited(0),
            v => UsageLimit::Limited(u32::try_from(v).unwrap_or(u32::MAX)),
        }
    }
}

impl From<UsageLimit> for i64 {
    fn from(limit: UsageLimit) -> Self {
        match limit {
            UsageLimit::Unlimited => UsageLimit::UNLIMITED_SENTINEL,
            UsageLimit::Limited(n) => i64::from(n),
        }
    }
}

/// Pure limit check: `-1` is unlimited, otherwise `current_count < limit`.
///
/// # Examples
///
/// ```
/// use invoicing_org::check_limit;
///
/// assert!(check_limit(-1, 1_000_000));
/// assert!(check_limit(5, 4));
/// assert!(!check_limit(5, 5));
/// assert!(!check_limit(0, 0));
/// ```
pub fn check_limit(limit: i64, current_count: u64) -> bool {
    UsageLimit::from(limit).permits(current_count)
}

/// The creation limits carried by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Invoices per calendar month
    pub invoices_per_month: UsageLimit,

    /// Clients, all time
    pub clients: UsageLimit,

    /// Members, all time
    pub users: UsageLimit,
}

/// Resources whose creation is capped by the subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LimitedResource {
    /// Invoices (counted per calendar month)
    Invoices,

    /// Clients (counted all time)
    Clients,

    /// Members (counted all time)
    Users,
}

impl LimitedResource {
    /// Get the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitedResource::Invoices => "invoices",
            LimitedResource::Clients => "clients",
            LimitedResource::Users => "users",
        }
    }

    /// Parse from the wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "invoices" => Some(LimitedResource::Invoices),
            "clients" => Some(LimitedResource::Clients),
            "users" => Some(LimitedResource::Users),
            _ => None,
        }
    }

    /// Map a permission resource to its limit, if it has one.
    pub fn from_resource(resource: invoicing_rbac::ResourceType) -> Option<Self> {
        use invoicing_rbac::ResourceType;
        match resource {
            ResourceType::Invoices => Some(LimitedResource::Invoices),
            ResourceType::Clients => Some(LimitedResource::Clients),
            ResourceType::Users => Some(LimitedResource::Users),
            _ => None,
        }
    }

    /// The counting window in effect at `now`.
    pub fn period_at(&self, now: DateTime<Utc>) -> UsagePeriod {
        match self {
            LimitedResource::Invoices => UsagePeriod::month_of(now),
            LimitedResource::Clients | LimitedResource::Users => UsagePeriod::AllTime,
        }
    }
}

impl std::fmt::Display for LimitedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counting window for usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UsagePeriod {
    /// Every row ever created
    AllTime,

    /// Rows created in one calendar month (UTC)
    Month {
        /// Calendar year
        year: i32,
        /// Month, 1-12
        month: u32,
    },
}

impl UsagePeriod {
    /// The calendar month containing `at`.
    pub fn month_of(at: DateTime<Utc>) -> Self {
        UsagePeriod::Month {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Check whether a row created at `created_at` falls in this window.
    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        match self {
            UsagePeriod::AllTime => true,
            UsagePeriod::Month { year, month } => {
                created_at.year() == *year && created_at.month() == *month
            }
        }
    }
}

/// An organization's subscription.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use invoicing_org::{Subscription, SubscriptionPlan};
///
/// let sub = Subscription::new(Uuid::now_v7(), SubscriptionPlan::Free);
/// assert!(sub.is_active());
/// assert!(!sub.is_expired());
/// assert!(sub.can_create_invoices(4));
/// assert!(!sub.can_create_invoices(5));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    pub id: Uuid,

    /// Owning organization (one subscription per organization)
    pub organization_id: Uuid,

    /// Plan
    pub plan_type: SubscriptionPlan,

    /// Lifecycle status
    pub status: SubscriptionStatus,

    /// Billing provider subscription reference
    #[serde(default)]
    pub paypal_subscription_id: Option<String>,

    /// Billing provider plan reference
    #[serde(default)]
    pub paypal_plan_id: Option<String>,

    /// Start of the current billing period
    pub current_period_start: Option<DateTime<Utc>>,

    /// End of the current billing period (None = open-ended)
    pub current_period_end: Option<DateTime<Utc>>,

    /// End of the trial, if any
    pub trial_end: Option<DateTime<Utc>>,

    /// Invoices per calendar month
    pub monthly_invoice_limit: UsageLimit,

    /// Clients, all time
    pub monthly_client_limit: UsageLimit,

    /// Members, all time
    pub monthly_user_limit: UsageLimit,

    /// When the subscription was created
    pub created_at: DateTime<Utc>,

    /// When the subscription was last updated
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Creates an active, open-ended subscription carrying the plan's limits.
    pub fn new(organization_id: Uuid, plan: SubscriptionPlan) -> Self {
        let now = Utc::now();
        let limits = plan.limits();
        Self {
            id: Uuid::now_v7(),
            organization_id,
            plan_type: plan,
            status: SubscriptionStatus::Active,
            paypal_subscription_id: None,
            paypal_plan_id: None,
            current_period_start: Some(now),
            current_period_end: None,
            trial_end: None,
            monthly_invoice_limit: limits.invoices_per_month,
            monthly_client_limit: limits.clients,
            monthly_user_limit: limits.users,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the end of the current billing period.
    pub fn with_period_end(mut self, end: DateTime<Utc>) -> Self {
        self.current_period_end = Some(end);
        self
    }

    /// Set the lifecycle status.
    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    /// Override all three limits.
    pub fn with_limits(mut self, limits: PlanLimits) -> Self {
        self.monthly_invoice_limit = limits.invoices_per_month;
        self.monthly_client_limit = limits.clients;
        self.monthly_user_limit = limits.users;
        self
    }

    /// Check if the status is `active`. Says nothing about the period.
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Check if the billing period has ended, by wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check if the billing period had ended at `now`.
    ///
    /// Open-ended subscriptions never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.current_period_end.is_some_and(|end| end < now)
    }

    /// Both gate conditions: active status and an unexpired period.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && !self.is_expired_at(now)
    }

    /// Whole days left in the period; 0 when open-ended or past.
    pub fn days_until_expiry_at(&self, now: DateTime<Utc>) -> i64 {
        match self.current_period_end {
            Some(end) => (end - now).num_days().max(0),
            None => 0,
        }
    }

    /// The limit applying to a resource.
    pub fn limit_for(&self, resource: LimitedResource) -> UsageLimit {
        match resource {
            LimitedResource::Invoices => self.monthly_invoice_limit,
            LimitedResource::Clients => self.monthly_client_limit,
            LimitedResource::Users => self.monthly_user_limit,
        }
    }

    /// Check whether one more `resource` may be created given the current count.
    pub fn check_limit(&self, resource: LimitedResource, current_count: u64) -> bool {
        self.limit_for(resource).permits(current_count)
    }

    /// Check the monthly invoice limit.
    pub fn can_create_invoices(&self, current_month_count: u64) -> bool {
        self.check_limit(LimitedResource::Invoices, current_month_count)
    }

    /// Check the client limit.
    pub fn can_create_clients(&self, current_count: u64) -> bool {
        self.check_limit(LimitedResource::Clients, current_count)
    }

    /// Check the member limit.
    pub fn can_add_users(&self, current_count: u64) -> bool {
        self.check_limit(LimitedResource::Users, current_count)
    }
}
