use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            access_cache::AccessDecisionCache,
            subscription_events::{SubscriptionEvent, SubscriptionEventPublisher},
        },
        use_cases::{plan_catalog::plan_config, trial::TrialPeriodRepo},
    },
    domain::entities::{
        plan_type::PlanType, subscription::Subscription, subscription_status::SubscriptionStatus,
        user_id::UserId,
    },
};

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: UserId,
    pub plan_type: PlanType,
    pub plan_value: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub external_customer_id: Option<String>,
}

/// Field values written by a status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    /// Status the row must still have for the write to apply.
    pub expected_status: SubscriptionStatus,
    pub status: SubscriptionStatus,
    pub end_date: DateTime<Utc>,
    pub grace_period_ends_at: Option<DateTime<Utc>>,
    pub last_payment_id: Option<String>,
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;

    async fn find_active_by_user(&self, user_id: &UserId) -> AppResult<Option<Subscription>>;

    /// Latest subscription that is not cancelled.
    async fn find_current_by_user(&self, user_id: &UserId) -> AppResult<Option<Subscription>>;

    /// Fails with `DuplicateActiveSubscription` if the user already has an active row.
    async fn insert(&self, new: &NewSubscription) -> AppResult<Subscription>;

    /// Applies `change` only if the row is still in `change.expected_status`.
    /// Returns `None` when the row moved underneath us.
    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> AppResult<Option<Subscription>>;

    /// Active rows whose paid period ended at or before `now`.
    async fn list_due_for_renewal(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>>;

    /// Pending rows whose grace deadline passed at or before `now`.
    async fn list_grace_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub moved_to_pending: usize,
    pub blocked: usize,
    pub failed: usize,
}

/// Outcome of the transition rules for one request.
#[derive(Debug, PartialEq)]
enum Transition {
    Apply(StatusChange),
    /// Payment already applied; nothing to write.
    AlreadyApplied,
}

/// Decide what a transition to `target` writes, or reject it.
fn plan_transition(
    sub: &Subscription,
    target: SubscriptionStatus,
    payment_ref: Option<&str>,
    now: DateTime<Utc>,
    grace_period_days: i64,
) -> AppResult<Transition> {
    use SubscriptionStatus::*;

    let reject = || AppError::InvalidTransition {
        from: sub.status.to_string(),
        to: target.to_string(),
    };

    let replayed = payment_ref.is_some() && payment_ref == sub.last_payment_id.as_deref();
    if replayed && sub.status == Active && target == Active {
        return Ok(Transition::AlreadyApplied);
    }

    let duration = Duration::days(plan_config(sub.plan_type).duration_days);
    let base = StatusChange {
        expected_status: sub.status,
        status: target,
        end_date: sub.end_date,
        grace_period_ends_at: sub.grace_period_ends_at,
        last_payment_id: sub.last_payment_id.clone(),
    };

    let change = match (sub.status, target) {
        // Only a new confirmed payment may re-activate an active row.
        (Active, Active) => {
            let payment_ref = payment_ref.ok_or_else(reject)?;
            // The first payment settles the cycle opened at creation.
            let end_date = if sub.last_payment_id.is_none() {
                sub.end_date
            } else {
                sub.end_date.max(now) + duration
            };
            StatusChange {
                end_date,
                last_payment_id: Some(payment_ref.to_string()),
                ..base
            }
        }
        // The payment that funded the lapsed cycle cannot fund the next one.
        (PendingPayment, Active) if replayed => return Err(reject()),
        (PendingPayment, Active) => StatusChange {
            end_date: now + duration,
            grace_period_ends_at: None,
            last_payment_id: payment_ref.map(str::to_string).or(sub.last_payment_id.clone()),
            ..base
        },
        (Active, PendingPayment) => StatusChange {
            grace_period_ends_at: Some(now + Duration::days(grace_period_days)),
            ..base
        },
        (PendingPayment, Blocked) => StatusChange {
            grace_period_ends_at: None,
            ..base
        },
        (from, Cancelled) if from.can_transition_to(Cancelled) => StatusChange {
            grace_period_ends_at: None,
            ..base
        },
        _ => return Err(reject()),
    };

    Ok(Transition::Apply(change))
}

pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
    trial_repo: Arc<dyn TrialPeriodRepo>,
    access_cache: Arc<dyn AccessDecisionCache>,
    events: Arc<dyn SubscriptionEventPublisher>,
    grace_period_days: i64,
}

impl SubscriptionUseCases {
    pub fn new(
        repo: Arc<dyn SubscriptionRepo>,
        trial_repo: Arc<dyn TrialPeriodRepo>,
        access_cache: Arc<dyn AccessDecisionCache>,
        events: Arc<dyn SubscriptionEventPublisher>,
        grace_period_days: i64,
    ) -> Self {
        Self {
            repo,
            trial_repo,
            access_cache,
            events,
            grace_period_days,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_user_active_subscription(
        &self,
        user_id: &UserId,
    ) -> AppResult<Option<Subscription>> {
        self.repo.find_active_by_user(user_id).await
    }

    /// Latest non-cancelled subscription, including pending and blocked rows.
    #[instrument(skip(self))]
    pub async fn get_current_subscription(
        &self,
        user_id: &UserId,
    ) -> AppResult<Option<Subscription>> {
        self.repo.find_current_by_user(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_subscription(&self, id: Uuid) -> AppResult<Subscription> {
        self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Open a paid subscription for the user's first cycle.
    #[instrument(skip(self))]
    pub async fn create_subscription(
        &self,
        user_id: &UserId,
        plan_type: PlanType,
        external_customer_ref: Option<String>,
    ) -> AppResult<Subscription> {
        if self.repo.find_active_by_user(user_id).await?.is_some() {
            return Err(AppError::DuplicateActiveSubscription);
        }

        let plan = plan_config(plan_type);
        let now = Utc::now();
        let new = NewSubscription {
            user_id: user_id.clone(),
            plan_type,
            plan_value: plan.price_cents,
            start_date: now,
            end_date: now + Duration::days(plan.duration_days),
            external_customer_id: external_customer_ref,
        };
        let subscription = self.repo.insert(&new).await?;

        if let Err(e) = self.trial_repo.mark_converted(user_id).await {
            tracing::warn!(user_id = %user_id, error = ?e, "Failed to mark trial as converted");
        }

        self.access_cache.invalidate(user_id).await;
        self.events.publish(SubscriptionEvent::SubscriptionCreated {
            subscription_id: subscription.id,
            user_id: user_id.clone(),
            plan_type,
            end_date: subscription.end_date,
        });

        tracing::info!(
            subscription_id = %subscription.id,
            user_id = %user_id,
            plan = %plan_type,
            "Subscription created"
        );
        Ok(subscription)
    }

    /// Move a subscription to `new_status`.
    ///
    /// Returns `Ok(false)` when the store could not be read or written.
    /// Reactivating a pending row while another row is active fails with
    /// `DuplicateActiveSubscription`.
    #[instrument(skip(self))]
    pub async fn update_subscription_status(
        &self,
        subscription_id: Uuid,
        new_status: &str,
        payment_ref: Option<&str>,
    ) -> AppResult<bool> {
        let target = SubscriptionStatus::from_str(new_status.trim())
            .map_err(|_| AppError::InvalidStatus(new_status.to_string()))?;

        self.transition(subscription_id, target, payment_ref, Utc::now())
            .await
    }

    /// Record a confirmed gateway payment, activating or renewing the subscription.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, subscription_id: Uuid, payment_ref: &str) -> AppResult<bool> {
        self.transition(
            subscription_id,
            SubscriptionStatus::Active,
            Some(payment_ref),
            Utc::now(),
        )
        .await
    }

    /// Renewal charge is overdue: start the grace window.
    #[instrument(skip(self))]
    pub async fn mark_overdue(&self, subscription_id: Uuid) -> AppResult<bool> {
        self.transition(
            subscription_id,
            SubscriptionStatus::PendingPayment,
            None,
            Utc::now(),
        )
        .await
    }

    /// Time-based expiry: lapsed active rows go to pending, lapsed grace windows get blocked.
    #[instrument(skip(self))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();

        for sub in self.repo.list_due_for_renewal(now).await? {
            match self
                .transition(sub.id, SubscriptionStatus::PendingPayment, None, now)
                .await
            {
                Ok(true) => report.moved_to_pending += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    tracing::warn!(subscription_id = %sub.id, error = ?e, "Skipping renewal expiry");
                    report.failed += 1;
                }
            }
        }

        for sub in self.repo.list_grace_expired(now).await? {
            match self
                .transition(sub.id, SubscriptionStatus::Blocked, None, now)
                .await
            {
                Ok(true) => report.blocked += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    tracing::warn!(subscription_id = %sub.id, error = ?e, "Skipping grace expiry");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn transition(
        &self,
        subscription_id: Uuid,
        target: SubscriptionStatus,
        payment_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let sub = match self.repo.get_by_id(subscription_id).await {
            Ok(Some(sub)) => sub,
            Ok(None) => return Err(AppError::NotFound),
            Err(AppError::Database(e)) => {
                tracing::error!(subscription_id = %subscription_id, error = %e, "Failed to load subscription");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let change = match plan_transition(&sub, target, payment_ref, now, self.grace_period_days)? {
            Transition::Apply(change) => change,
            Transition::AlreadyApplied => {
                tracing::debug!(
                    subscription_id = %subscription_id,
                    payment_ref = ?payment_ref,
                    "Payment already applied"
                );
                return Ok(true);
            }
        };

        let updated = match self.repo.apply_status_change(subscription_id, &change).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                return Err(AppError::InvalidTransition {
                    from: sub.status.to_string(),
                    to: target.to_string(),
                });
            }
            Err(AppError::Database(e)) => {
                tracing::error!(subscription_id = %subscription_id, error = %e, "Failed to update subscription status");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        self.access_cache.invalidate(&updated.user_id).await;

        if sub.status != updated.status {
            self.events.publish(SubscriptionEvent::StatusChanged {
                subscription_id,
                user_id: updated.user_id.clone(),
                from: sub.status,
                to: updated.status,
            });
        }
        if let Some(payment_id) = payment_ref.filter(|_| updated.status == SubscriptionStatus::Active) {
            self.events.publish(SubscriptionEvent::PaymentConfirmed {
                subscription_id,
                user_id: updated.user_id.clone(),
                payment_id: payment_id.to_string(),
                end_date: updated.end_date,
            });
        }

        tracing::info!(
            subscription_id = %subscription_id,
            from = %sub.status,
            to = %updated.status,
            end_date = %updated.end_date,
            "Subscription status updated"
        );
        Ok(true)
    }
}
