use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{
    app_error::AppResult,
    application::{
        ports::access_cache::AccessDecisionCache,
        use_cases::{
            plan_catalog::{VehicleQuota, check_vehicle_quota},
            subscription::SubscriptionRepo,
            trial::TrialPeriodRepo,
        },
    },
    domain::entities::{access_decision::AccessDecision, user_id::UserId},
};

pub struct AccessUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    trial_repo: Arc<dyn TrialPeriodRepo>,
    cache: Arc<dyn AccessDecisionCache>,
}

impl AccessUseCases {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepo>,
        trial_repo: Arc<dyn TrialPeriodRepo>,
        cache: Arc<dyn AccessDecisionCache>,
    ) -> Self {
        Self {
            subscription_repo,
            trial_repo,
            cache,
        }
    }

    /// Whether the user may use paid features right now.
    ///
    /// Never fails: if either store errors the user is reported inactive and
    /// the decision is not cached.
    #[instrument(skip(self))]
    pub async fn check_user_access(&self, user_id: &UserId) -> AccessDecision {
        if let Some(cached) = self.cache.get(user_id).await {
            return cached;
        }

        let generation = self.cache.generation();
        match self.evaluate(user_id, Utc::now()).await {
            Ok(decision) => {
                self.cache
                    .insert(user_id, decision.clone(), generation)
                    .await;
                decision
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = ?e, "Access check failed, denying access");
                AccessDecision::inactive()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn check_vehicle_quota(&self, user_id: &UserId, used: u32) -> VehicleQuota {
        let access = self.check_user_access(user_id).await;
        let plan = access.plan_type.filter(|_| access.is_active);
        check_vehicle_quota(plan, used)
    }

    /// Paid period first, then grace window, then trial.
    async fn evaluate(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<AccessDecision> {
        if let Some(sub) = self.subscription_repo.find_active_by_user(user_id).await?
            && sub.is_current(now)
        {
            return Ok(AccessDecision::from_subscription(&sub, now));
        }

        if let Some(sub) = self.subscription_repo.find_current_by_user(user_id).await?
            && sub.in_grace_period(now)
        {
            return Ok(AccessDecision::from_grace_period(&sub, now));
        }

        if let Some(trial) = self.trial_repo.find_latest_by_user(user_id).await?
            && trial.is_running(now)
        {
            return Ok(AccessDecision::from_trial(&trial, now));
        }

        Ok(AccessDecision::inactive())
    }
}
