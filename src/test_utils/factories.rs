//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    application::ports::access_cache::AccessDecisionCache,
    domain::entities::{
        plan_type::PlanType, subscription::Subscription, subscription_status::SubscriptionStatus,
        trial_period::TrialPeriod, user_id::UserId,
    },
    infra::access_cache::MokaAccessCache,
};

/// Unique user id in the shape the auth provider issues.
pub fn test_user_id() -> UserId {
    UserId(format!("user_{}", Uuid::new_v4().simple()))
}

/// Active basico subscription that started now and runs for 30 days.
pub fn create_test_subscription(
    user_id: &UserId,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let now = Utc::now();
    let mut subscription = Subscription {
        id: Uuid::new_v4(),
        user_id: user_id.clone(),
        plan_type: PlanType::Basico,
        plan_value: 4990,
        start_date: now,
        end_date: now + Duration::days(30),
        status: SubscriptionStatus::Active,
        last_payment_id: None,
        grace_period_ends_at: None,
        external_customer_id: None,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut subscription);
    subscription
}

/// Unconverted premium trial that started now and runs for 30 days.
pub fn create_test_trial(
    user_id: &UserId,
    overrides: impl FnOnce(&mut TrialPeriod),
) -> TrialPeriod {
    let now = Utc::now();
    let mut trial = TrialPeriod {
        id: Uuid::new_v4(),
        user_id: user_id.clone(),
        plan_type: PlanType::Premium,
        start_date: now,
        end_date: now + Duration::days(30),
        converted_to_paid: false,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut trial);
    trial
}

/// Fresh access cache; each test gets its own.
pub fn test_access_cache() -> Arc<dyn AccessDecisionCache> {
    Arc::new(MokaAccessCache::new(StdDuration::from_secs(60), 1_000))
}
