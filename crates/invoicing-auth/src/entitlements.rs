//! Subscription gate and usage limits
//!
//! The gate runs before any permission or limit check: the organization
//! needs a subscription that is both `active` and inside its billing
//! period. Limits apply to creation only.

use chrono::{DateTime, Utc};
use invoicing_org::{LimitedResource, Subscription};
use invoicing_rbac::{Action, ResourceType};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::store::{SubscriptionStore, UsageCounter};

/// Load the organization's subscription and check it is usable at `now`.
pub async fn check_subscription_active<S>(
    store: &S,
    organization_id: Uuid,
    now: DateTime<Utc>,
) -> AuthResult<Subscription>
where
    S: SubscriptionStore + ?Sized,
{
    let subscription = store.find_subscription(organization_id).await?;
    ensure_usable(subscription, now).map_err(|err| {
        warn!(organization_id = %organization_id, error = %err, "Subscription gate denied");
        err
    })
}

/// Gate a loaded subscription.
///
/// Missing, non-active and expired subscriptions are each rejected with
/// [`AuthError::SubscriptionRequired`]. Status and expiry are checked
/// independently.
pub fn ensure_usable(subscription: Option<Subscription>, now: DateTime<Utc>) -> AuthResult<Subscription> {
    let subscription = subscription.ok_or_else(|| {
        AuthError::SubscriptionRequired("organization has no subscription".to_string())
    })?;

    if !subscription.is_active() {
        return Err(AuthError::SubscriptionRequired(format!(
            "subscription is {}",
            subscription.status.as_str()
        )));
    }
    if subscription.is_expired_at(now) {
        return Err(AuthError::SubscriptionRequired(
            "subscription has expired".to_string(),
        ));
    }
    Ok(subscription)
}

/// The limit governing an operation, if any. Only creation is limited.
pub fn limited_resource_for(resource: ResourceType, action: Action) -> Option<LimitedResource> {
    if !action.is_creation() {
        return None;
    }
    LimitedResource::from_resource(resource)
}

/// Check whether the organization may create one more `resource` at `now`.
pub async fn check_usage_limit<S>(
    store: &S,
    resource: LimitedResource,
    subscription: &Subscription,
    organization_id: Uuid,
    now: DateTime<Utc>,
) -> AuthResult<bool>
where
    S: UsageCounter + ?Sized,
{
    let limit = subscription.limit_for(resource);
    if limit.is_unlimited() {
        return Ok(true);
    }

    let period = resource.period_at(now);
    let count = store.count_usage(organization_id, resource, period).await?;
    let allowed = limit.permits(count);

    debug!(
        organization_id = %organization_id,
        resource = %resource,
        count,
        limit = i64::from(limit),
        allowed,
        "Checked usage limit"
    );
    Ok(allowed)
}

/// Like [`check_usage_limit`] but fails with [`AuthError::LimitReached`].
pub async fn enforce_usage_limit<S>(
    store: &S,
    resource: LimitedResource,
    subscription: &Subscription,
    organization_id: Uuid,
    now: DateTime<Utc>,
) -> AuthResult<()>
where
    S: UsageCounter + ?Sized,
{
    if check_usage_limit(store, resource, subscription, organization_id, now).await? {
        Ok(())
    } else {
        warn!(organization_id = %organization_id, resource = %resource, "Usage limit reached");
        Err(AuthError::LimitReached(resource))
    }
}
