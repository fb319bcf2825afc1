use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{plan_type::PlanType, time_window::days_remaining, user_id::UserId};

/// One-time free access window. Rows are never deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrialPeriod {
    pub id: Uuid,
    pub user_id: UserId,
    pub plan_type: PlanType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub converted_to_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrialPeriod {
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        !self.converted_to_paid && now < self.end_date
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        days_remaining(self.end_date, now)
    }
}

/// Result of looking up a user's trial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatus {
    pub is_in_trial: bool,
    pub trial_period: Option<TrialPeriod>,
    pub days_remaining: Option<i64>,
}

impl TrialStatus {
    pub fn none() -> Self {
        Self {
            is_in_trial: false,
            trial_period: None,
            days_remaining: None,
        }
    }

    pub fn evaluate(trial: Option<TrialPeriod>, now: DateTime<Utc>) -> Self {
        match trial {
            Some(trial) => Self {
                is_in_trial: trial.is_running(now),
                days_remaining: Some(trial.days_remaining(now)),
                trial_period: Some(trial),
            },
            None => Self::none(),
        }
    }
}
