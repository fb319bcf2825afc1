use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{plan_type::PlanType, subscription_status::SubscriptionStatus, user_id::UserId};

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: UserId,
    pub plan_type: PlanType,
    /// Price charged per cycle, in centavos.
    pub plan_value: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    /// Gateway payment id of the last confirmed payment.
    pub last_payment_id: Option<String>,
    pub grace_period_ends_at: Option<DateTime<Utc>>,
    pub external_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date > now
    }

    /// Pending payment but still inside the grace window.
    pub fn in_grace_period(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::PendingPayment
            && self.grace_period_ends_at.is_some_and(|ends| ends > now)
    }
}
