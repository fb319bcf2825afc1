use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle status of a paid subscription.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    Active,
    PendingPayment,
    Blocked,
    #[strum(to_string = "cancelled", serialize = "canceled")]
    Cancelled,
}

impl SubscriptionStatus {
    /// Valid transitions from this status. Cancelled is terminal.
    pub fn valid_transitions(&self) -> &'static [SubscriptionStatus] {
        match self {
            SubscriptionStatus::Active => &[
                SubscriptionStatus::PendingPayment,
                SubscriptionStatus::Cancelled,
            ],
            SubscriptionStatus::PendingPayment => &[
                SubscriptionStatus::Active,
                SubscriptionStatus::Blocked,
                SubscriptionStatus::Cancelled,
            ],
            SubscriptionStatus::Blocked => &[SubscriptionStatus::Cancelled],
            SubscriptionStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, new_status: SubscriptionStatus) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}
