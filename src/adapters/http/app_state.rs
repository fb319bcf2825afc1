use std::sync::Arc;

use crate::{
    application::use_cases::{
        access::AccessUseCases, payment::PaymentUseCases, subscription::SubscriptionUseCases,
        trial::TrialUseCases,
    },
    infra::{RateLimiterTrait, config::AppConfig},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub trial_use_cases: Arc<TrialUseCases>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub access_use_cases: Arc<AccessUseCases>,
    pub payment_use_cases: Arc<PaymentUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
