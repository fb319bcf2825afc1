use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    plan_type::PlanType, subscription::Subscription, time_window::days_remaining,
    trial_period::TrialPeriod,
};

/// Why a user has (or lacks) access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    Active,
    Trial,
    GracePeriod,
    Inactive,
}

/// Derived per request from trial and subscription state; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub is_active: bool,
    pub plan_type: Option<PlanType>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: AccessStatus,
    pub days_remaining: Option<i64>,
}

impl AccessDecision {
    pub fn inactive() -> Self {
        Self {
            is_active: false,
            plan_type: None,
            expires_at: None,
            status: AccessStatus::Inactive,
            days_remaining: None,
        }
    }

    pub fn from_subscription(sub: &Subscription, now: DateTime<Utc>) -> Self {
        Self {
            is_active: true,
            plan_type: Some(sub.plan_type),
            expires_at: Some(sub.end_date),
            status: AccessStatus::Active,
            days_remaining: Some(days_remaining(sub.end_date, now)),
        }
    }

    pub fn from_grace_period(sub: &Subscription, now: DateTime<Utc>) -> Self {
        let ends = sub.grace_period_ends_at.unwrap_or(now);
        Self {
            is_active: true,
            plan_type: Some(sub.plan_type),
            expires_at: Some(ends),
            status: AccessStatus::GracePeriod,
            days_remaining: Some(days_remaining(ends, now)),
        }
    }

    pub fn from_trial(trial: &TrialPeriod, now: DateTime<Utc>) -> Self {
        Self {
            is_active: true,
            plan_type: Some(trial.plan_type),
            expires_at: Some(trial.end_date),
            status: AccessStatus::Trial,
            days_remaining: Some(trial.days_remaining(now)),
        }
    }
}
