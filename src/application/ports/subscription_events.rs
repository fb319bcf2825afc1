use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{
    plan_type::PlanType, subscription_status::SubscriptionStatus, user_id::UserId,
};

/// Something happened to a user's billing state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionEvent {
    TrialStarted {
        user_id: UserId,
        plan_type: PlanType,
        ends_at: DateTime<Utc>,
    },
    SubscriptionCreated {
        subscription_id: Uuid,
        user_id: UserId,
        plan_type: PlanType,
        end_date: DateTime<Utc>,
    },
    StatusChanged {
        subscription_id: Uuid,
        user_id: UserId,
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },
    PaymentConfirmed {
        subscription_id: Uuid,
        user_id: UserId,
        payment_id: String,
        end_date: DateTime<Utc>,
    },
}

impl SubscriptionEvent {
    pub fn user_id(&self) -> &UserId {
        match self {
            SubscriptionEvent::TrialStarted { user_id, .. }
            | SubscriptionEvent::SubscriptionCreated { user_id, .. }
            | SubscriptionEvent::StatusChanged { user_id, .. }
            | SubscriptionEvent::PaymentConfirmed { user_id, .. } => user_id,
        }
    }
}

/// Fire-and-forget notification sink. Publishing never fails the caller.
pub trait SubscriptionEventPublisher: Send + Sync {
    fn publish(&self, event: SubscriptionEvent);
}
