//! In-memory mock implementations for billing repositories and the payment gateway.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            payment_gateway::{
                Charge, ChargeRequest, CustomerRef, NewCustomer, PaymentGateway, PaymentStatusInfo,
                PixCharge,
            },
            subscription_events::{SubscriptionEvent, SubscriptionEventPublisher},
        },
        use_cases::{
            subscription::{NewSubscription, StatusChange, SubscriptionRepo},
            trial::TrialPeriodRepo,
        },
    },
    domain::entities::{
        billing_type::BillingType, payment_status::PaymentStatus, plan_type::PlanType,
        subscription::Subscription, subscription_status::SubscriptionStatus,
        trial_period::TrialPeriod, user_id::UserId,
    },
    infra::RateLimiterTrait,
};

// ============================================================================
// InMemoryTrialRepo
// ============================================================================

/// Keyed by user id, which mirrors the unique constraint on `trial_periods.user_id`.
#[derive(Default)]
pub struct InMemoryTrialRepo {
    trials: Mutex<HashMap<UserId, TrialPeriod>>,
    conflict_next_insert: AtomicBool,
}

impl InMemoryTrialRepo {
    pub fn seed(&self, trial: TrialPeriod) -> TrialPeriod {
        self.trials
            .lock()
            .unwrap()
            .insert(trial.user_id.clone(), trial.clone());
        trial
    }

    pub fn get(&self, user_id: &UserId) -> Option<TrialPeriod> {
        self.trials.lock().unwrap().get(user_id).cloned()
    }

    /// Simulate another request inserting the same user's trial first.
    pub fn fail_next_insert_with_conflict(&self) {
        self.conflict_next_insert.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrialPeriodRepo for InMemoryTrialRepo {
    async fn find_latest_by_user(&self, user_id: &UserId) -> AppResult<Option<TrialPeriod>> {
        Ok(self.get(user_id))
    }

    async fn insert(
        &self,
        user_id: &UserId,
        plan_type: PlanType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<TrialPeriod> {
        if self.conflict_next_insert.swap(false, Ordering::SeqCst) {
            return Err(AppError::TrialAlreadyUsed);
        }

        let mut trials = self.trials.lock().unwrap();
        if trials.contains_key(user_id) {
            return Err(AppError::TrialAlreadyUsed);
        }

        let trial = TrialPeriod {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            plan_type,
            start_date,
            end_date,
            converted_to_paid: false,
            created_at: start_date,
            updated_at: start_date,
        };
        trials.insert(user_id.clone(), trial.clone());
        Ok(trial)
    }

    async fn mark_converted(&self, user_id: &UserId) -> AppResult<bool> {
        let mut trials = self.trials.lock().unwrap();
        match trials.get_mut(user_id) {
            Some(trial) if !trial.converted_to_paid => {
                trial.converted_to_paid = true;
                trial.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

/// Enforces one active row per user like the partial unique index does.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    subscriptions: Mutex<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn seed(&self, subscription: Subscription) -> Subscription {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id, subscription.clone());
        subscription
    }

    pub fn get(&self, id: Uuid) -> Option<Subscription> {
        self.subscriptions.lock().unwrap().get(&id).cloned()
    }

    pub fn all_for_user(&self, user_id: &UserId) -> Vec<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect()
    }
}

fn has_other_active(
    subscriptions: &HashMap<Uuid, Subscription>,
    user_id: &UserId,
    except: Option<Uuid>,
) -> bool {
    subscriptions.values().any(|s| {
        &s.user_id == user_id && s.status == SubscriptionStatus::Active && Some(s.id) != except
    })
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.get(id))
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> AppResult<Option<Subscription>> {
        Ok(self
            .all_for_user(user_id)
            .into_iter()
            .find(|s| s.status == SubscriptionStatus::Active))
    }

    async fn find_current_by_user(&self, user_id: &UserId) -> AppResult<Option<Subscription>> {
        Ok(self
            .all_for_user(user_id)
            .into_iter()
            .filter(|s| s.status != SubscriptionStatus::Cancelled)
            .max_by_key(|s| s.created_at))
    }

    async fn insert(&self, new: &NewSubscription) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if has_other_active(&subscriptions, &new.user_id, None) {
            return Err(AppError::DuplicateActiveSubscription);
        }

        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id: new.user_id.clone(),
            plan_type: new.plan_type,
            plan_value: new.plan_value,
            start_date: new.start_date,
            end_date: new.end_date,
            status: SubscriptionStatus::Active,
            last_payment_id: None,
            grace_period_ends_at: None,
            external_customer_id: new.external_customer_id.clone(),
            created_at: now,
            updated_at: now,
        };
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> AppResult<Option<Subscription>> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let Some(current) = subscriptions.get(&id) else {
            return Ok(None);
        };
        if current.status != change.expected_status {
            return Ok(None);
        }
        if change.status == SubscriptionStatus::Active
            && has_other_active(&subscriptions, &current.user_id, Some(id))
        {
            return Err(AppError::DuplicateActiveSubscription);
        }

        let Some(subscription) = subscriptions.get_mut(&id) else {
            return Ok(None);
        };
        subscription.status = change.status;
        subscription.end_date = change.end_date;
        subscription.grace_period_ends_at = change.grace_period_ends_at;
        subscription.last_payment_id = change.last_payment_id.clone();
        subscription.updated_at = Utc::now();
        Ok(Some(subscription.clone()))
    }

    async fn list_due_for_renewal(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.status == SubscriptionStatus::Active && s.end_date <= now)
            .cloned()
            .collect())
    }

    async fn list_grace_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| {
                s.status == SubscriptionStatus::PendingPayment
                    && s.grace_period_ends_at.is_some_and(|ends| ends <= now)
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// FailingSubscriptionRepo
// ============================================================================

/// Every call fails as if the database were down.
#[derive(Default)]
pub struct FailingSubscriptionRepo;

fn db_down<T>() -> AppResult<T> {
    Err(AppError::Database("connection refused".into()))
}

#[async_trait]
impl SubscriptionRepo for FailingSubscriptionRepo {
    async fn get_by_id(&self, _id: Uuid) -> AppResult<Option<Subscription>> {
        db_down()
    }

    async fn find_active_by_user(&self, _user_id: &UserId) -> AppResult<Option<Subscription>> {
        db_down()
    }

    async fn find_current_by_user(&self, _user_id: &UserId) -> AppResult<Option<Subscription>> {
        db_down()
    }

    async fn insert(&self, _new: &NewSubscription) -> AppResult<Subscription> {
        db_down()
    }

    async fn apply_status_change(
        &self,
        _id: Uuid,
        _change: &StatusChange,
    ) -> AppResult<Option<Subscription>> {
        db_down()
    }

    async fn list_due_for_renewal(&self, _now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        db_down()
    }

    async fn list_grace_expired(&self, _now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        db_down()
    }
}

// ============================================================================
// StubGateway
// ============================================================================

/// Records requests and answers like a healthy gateway.
#[derive(Default)]
pub struct StubGateway {
    customers: Mutex<Vec<NewCustomer>>,
    charges: Mutex<Vec<ChargeRequest>>,
    payments: Mutex<HashMap<String, PaymentStatusInfo>>,
    next_failure: Mutex<Option<AppError>>,
    counter: AtomicU64,
}

impl StubGateway {
    pub fn customers(&self) -> Vec<NewCustomer> {
        self.customers.lock().unwrap().clone()
    }

    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().unwrap().clone()
    }

    /// The next gateway call fails with `error`.
    pub fn fail_with(&self, error: AppError) {
        *self.next_failure.lock().unwrap() = Some(error);
    }

    pub fn set_payment_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
        external_reference: Option<String>,
    ) {
        self.payments.lock().unwrap().insert(
            payment_id.to_string(),
            PaymentStatusInfo {
                payment_id: payment_id.to_string(),
                status,
                external_reference,
            },
        );
    }

    fn check_failure(&self) -> AppResult<()> {
        match self.next_failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}_{:06}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn record_charge(&self, request: ChargeRequest) -> String {
        let payment_id = self.next_id("pay");
        self.set_payment_status(
            &payment_id,
            PaymentStatus::Pending,
            request.external_reference.clone(),
        );
        self.charges.lock().unwrap().push(request);
        payment_id
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_customer(&self, customer: &NewCustomer) -> AppResult<CustomerRef> {
        self.check_failure()?;
        self.customers.lock().unwrap().push(customer.clone());
        Ok(CustomerRef::new(self.next_id("cus")))
    }

    async fn create_charge(&self, request: &ChargeRequest) -> AppResult<Charge> {
        self.check_failure()?;
        let payment_id = self.record_charge(request.clone());
        Ok(Charge {
            bank_slip_url: (request.billing_type == BillingType::Boleto)
                .then(|| format!("https://sandbox.asaas.test/b/pdf/{payment_id}")),
            invoice_url: Some(format!("https://sandbox.asaas.test/i/{payment_id}")),
            payment_id,
            status: PaymentStatus::Pending,
            billing_type: request.billing_type,
            value_cents: request.value_cents,
            due_date: request.due_date,
        })
    }

    async fn create_pix_charge(
        &self,
        customer: &CustomerRef,
        value_cents: i64,
        due_date: NaiveDate,
        external_reference: Option<&str>,
    ) -> AppResult<PixCharge> {
        self.check_failure()?;
        let payment_id = self.record_charge(ChargeRequest {
            customer: customer.clone(),
            billing_type: BillingType::Pix,
            value_cents,
            due_date,
            description: None,
            external_reference: external_reference.map(str::to_string),
        });
        Ok(PixCharge {
            copy_paste: format!("00020126580014br.gov.bcb.pix0136{payment_id}"),
            qr_code: "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==".to_string(),
            expires_at: due_date
                .and_hms_opt(23, 59, 59)
                .map(|dt| dt.and_utc()),
            payment_id,
        })
    }

    async fn get_payment_status(&self, payment_id: &str) -> AppResult<PaymentStatusInfo> {
        self.check_failure()?;
        self.payments
            .lock()
            .unwrap()
            .get(payment_id)
            .cloned()
            .ok_or_else(|| AppError::GatewayRejected("Cobrança não encontrada.".into()))
    }
}

// ============================================================================
// RecordingPublisher
// ============================================================================

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<SubscriptionEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<SubscriptionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SubscriptionEventPublisher for RecordingPublisher {
    fn publish(&self, event: SubscriptionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

/// In-memory rate limiter for testing.
/// Uses HashMap to track request counts per key.
pub struct InMemoryRateLimiter {
    counts: Mutex<HashMap<String, u64>>,
    max_per_ip: u64,
}

impl InMemoryRateLimiter {
    pub fn new(max_per_ip: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_ip,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(u64::MAX)
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(format!("rate:ip:{ip}")).or_insert(0);
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_subscription, test_user_id};

    #[tokio::test]
    async fn subscription_repo_rejects_second_active_row() {
        let repo = InMemorySubscriptionRepo::default();
        let user_id = test_user_id();
        repo.seed(create_test_subscription(&user_id, |_| {}));

        let now = Utc::now();
        let err = repo
            .insert(&NewSubscription {
                user_id,
                plan_type: PlanType::Premium,
                plan_value: 9990,
                start_date: now,
                end_date: now,
                external_customer_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateActiveSubscription));
    }

    #[tokio::test]
    async fn stub_gateway_fails_once() {
        let gateway = StubGateway::default();
        gateway.fail_with(AppError::GatewayUnavailable("down".into()));

        assert!(gateway.get_payment_status("pay_1").await.is_err());
        gateway.set_payment_status("pay_1", PaymentStatus::Confirmed, None);
        assert!(gateway.get_payment_status("pay_1").await.is_ok());
    }
}
