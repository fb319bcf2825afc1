use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        access_cache::AccessDecisionCache,
        subscription_events::{SubscriptionEvent, SubscriptionEventPublisher},
    },
    domain::entities::{
        plan_type::PlanType,
        trial_period::{TrialPeriod, TrialStatus},
        user_id::UserId,
    },
};

#[async_trait]
pub trait TrialPeriodRepo: Send + Sync {
    /// Most recent trial for the user, converted or not.
    async fn find_latest_by_user(&self, user_id: &UserId) -> AppResult<Option<TrialPeriod>>;

    /// Fails with `TrialAlreadyUsed` if the user already has a trial row.
    async fn insert(
        &self,
        user_id: &UserId,
        plan_type: PlanType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<TrialPeriod>;

    /// Returns whether a row was updated.
    async fn mark_converted(&self, user_id: &UserId) -> AppResult<bool>;
}

pub struct TrialUseCases {
    repo: Arc<dyn TrialPeriodRepo>,
    access_cache: Arc<dyn AccessDecisionCache>,
    events: Arc<dyn SubscriptionEventPublisher>,
    trial_days: i64,
}

impl TrialUseCases {
    pub fn new(
        repo: Arc<dyn TrialPeriodRepo>,
        access_cache: Arc<dyn AccessDecisionCache>,
        events: Arc<dyn SubscriptionEventPublisher>,
        trial_days: i64,
    ) -> Self {
        Self {
            repo,
            access_cache,
            events,
            trial_days,
        }
    }

    /// Start the user's one-time trial.
    #[instrument(skip(self))]
    pub async fn create_trial(
        &self,
        user_id: &UserId,
        plan_type: PlanType,
    ) -> AppResult<TrialPeriod> {
        if self.repo.find_latest_by_user(user_id).await?.is_some() {
            return Err(AppError::TrialAlreadyUsed);
        }

        let start = Utc::now();
        let end = start + Duration::days(self.trial_days);
        // A concurrent request can still win the insert; the repo maps that to TrialAlreadyUsed.
        let trial = self.repo.insert(user_id, plan_type, start, end).await?;

        self.access_cache.invalidate(user_id).await;
        self.events.publish(SubscriptionEvent::TrialStarted {
            user_id: user_id.clone(),
            plan_type,
            ends_at: trial.end_date,
        });

        tracing::info!(user_id = %user_id, plan = %plan_type, ends_at = %trial.end_date, "Trial started");
        Ok(trial)
    }

    #[instrument(skip(self))]
    pub async fn check_trial(&self, user_id: &UserId) -> AppResult<TrialStatus> {
        let trial = self.repo.find_latest_by_user(user_id).await?;
        Ok(TrialStatus::evaluate(trial, Utc::now()))
    }
}
