//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates an `AppState`
//! backed by in-memory repositories and a stub gateway.

use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::{
            access_cache::AccessDecisionCache, payment_gateway::PaymentGateway,
            subscription_events::SubscriptionEventPublisher,
        },
        use_cases::{
            access::AccessUseCases,
            payment::PaymentUseCases,
            subscription::{SubscriptionRepo, SubscriptionUseCases},
            trial::{TrialPeriodRepo, TrialUseCases},
        },
    },
    domain::entities::{subscription::Subscription, trial_period::TrialPeriod},
    infra::{RateLimiterTrait, config::AppConfig},
    test_utils::{
        InMemoryRateLimiter, InMemorySubscriptionRepo, InMemoryTrialRepo, RecordingPublisher,
        StubGateway, test_access_cache,
    },
};

/// Value the test state expects in the `asaas-access-token` header.
pub const TEST_WEBHOOK_TOKEN: &str = "whsec_test";

/// Handles to the mocks behind a built `AppState`, for seeding and assertions.
pub struct TestMocks {
    pub subscription_repo: Arc<InMemorySubscriptionRepo>,
    pub trial_repo: Arc<InMemoryTrialRepo>,
    pub gateway: Arc<StubGateway>,
    pub events: Arc<RecordingPublisher>,
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user_id = test_user_id();
/// let app_state = TestAppStateBuilder::new()
///     .with_trial(create_test_trial(&user_id, |_| {}))
///     .build();
/// ```
pub struct TestAppStateBuilder {
    subscriptions: Vec<Subscription>,
    trials: Vec<TrialPeriod>,
    gateway: Arc<StubGateway>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            subscriptions: vec![],
            trials: vec![],
            gateway: Arc::new(StubGateway::default()),
        }
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn with_trial(mut self, trial: TrialPeriod) -> Self {
        self.trials.push(trial);
        self
    }

    /// Use a gateway the test already holds, e.g. one primed with `fail_with`.
    pub fn with_gateway(mut self, gateway: Arc<StubGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }

    pub fn build_with_mocks(self) -> (AppState, TestMocks) {
        let subscription_repo = Arc::new(InMemorySubscriptionRepo::default());
        for subscription in self.subscriptions {
            subscription_repo.seed(subscription);
        }
        let trial_repo = Arc::new(InMemoryTrialRepo::default());
        for trial in self.trials {
            trial_repo.seed(trial);
        }
        let events = Arc::new(RecordingPublisher::default());
        let access_cache: Arc<dyn AccessDecisionCache> = test_access_cache();

        let config = test_config();

        let trial_use_cases = TrialUseCases::new(
            trial_repo.clone() as Arc<dyn TrialPeriodRepo>,
            access_cache.clone(),
            events.clone() as Arc<dyn SubscriptionEventPublisher>,
            config.trial_days,
        );
        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            subscription_repo.clone() as Arc<dyn SubscriptionRepo>,
            trial_repo.clone() as Arc<dyn TrialPeriodRepo>,
            access_cache.clone(),
            events.clone() as Arc<dyn SubscriptionEventPublisher>,
            config.grace_period_days,
        ));
        let access_use_cases = AccessUseCases::new(
            subscription_repo.clone() as Arc<dyn SubscriptionRepo>,
            trial_repo.clone() as Arc<dyn TrialPeriodRepo>,
            access_cache,
        );
        let payment_use_cases = PaymentUseCases::new(
            self.gateway.clone() as Arc<dyn PaymentGateway>,
            subscription_use_cases.clone(),
            config.asaas_webhook_token.clone(),
            config.pix_due_days,
        );

        let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(InMemoryRateLimiter::permissive());

        let app_state = AppState {
            config: Arc::new(config),
            trial_use_cases: Arc::new(trial_use_cases),
            subscription_use_cases,
            access_use_cases: Arc::new(access_use_cases),
            payment_use_cases: Arc::new(payment_use_cases),
            rate_limiter,
        };

        let mocks = TestMocks {
            subscription_repo,
            trial_repo,
            gateway: self.gateway,
            events,
        };
        (app_state, mocks)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Config with placeholder values; nothing here reaches a real service.
pub fn test_config() -> AppConfig {
    AppConfig {
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
        database_url: String::new(),
        redis_url: String::new(),
        rate_limit_window_secs: 60,
        rate_limit_per_ip: 120,
        trust_proxy: false,
        asaas_api_url: Url::parse("http://asaas.test/api/v3").unwrap(),
        asaas_api_key: SecretString::from("test_api_key"),
        asaas_webhook_token: SecretString::from(TEST_WEBHOOK_TOKEN),
        gateway_timeout_secs: 5,
        trial_days: 30,
        grace_period_days: 5,
        pix_due_days: 3,
        access_cache_ttl_secs: 60,
        access_cache_max_entries: 1000,
        billing_sweep_seconds: 3600,
    }
}
