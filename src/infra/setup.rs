use std::{fs::File, sync::Arc, time::Duration};

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

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
    infra::{
        RateLimiterTrait, RedisRateLimiter, access_cache::MokaAccessCache,
        asaas_client::AsaasClient, config::AppConfig, event_bus::BroadcastEventBus,
        postgres_persistence,
    },
};

/// Wire config, persistence, gateway and use cases together.
///
/// Also returns the event bus so the caller can attach consumers.
pub async fn init_app_state() -> anyhow::Result<(AppState, BroadcastEventBus)> {
    let config = AppConfig::from_env()?;

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let subscription_repo = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;
    let trial_repo = postgres_arc as Arc<dyn TrialPeriodRepo>;

    let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
        )
        .await?,
    );

    let gateway: Arc<dyn PaymentGateway> = Arc::new(AsaasClient::new(
        config.asaas_api_url.clone(),
        config.asaas_api_key.clone(),
        Duration::from_secs(config.gateway_timeout_secs),
    )?);

    let access_cache: Arc<dyn AccessDecisionCache> = Arc::new(MokaAccessCache::new(
        Duration::from_secs(config.access_cache_ttl_secs),
        config.access_cache_max_entries,
    ));

    let event_bus = BroadcastEventBus::new();
    let events: Arc<dyn SubscriptionEventPublisher> = Arc::new(event_bus.clone());

    let trial_use_cases = TrialUseCases::new(
        trial_repo.clone(),
        access_cache.clone(),
        events.clone(),
        config.trial_days,
    );

    let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
        subscription_repo.clone(),
        trial_repo.clone(),
        access_cache.clone(),
        events,
        config.grace_period_days,
    ));

    let access_use_cases = AccessUseCases::new(subscription_repo, trial_repo, access_cache);

    let payment_use_cases = PaymentUseCases::new(
        gateway,
        subscription_use_cases.clone(),
        config.asaas_webhook_token.clone(),
        config.pix_due_days,
    );

    let app_state = AppState {
        config: Arc::new(config),
        trial_use_cases: Arc::new(trial_use_cases),
        subscription_use_cases,
        access_use_cases: Arc::new(access_use_cases),
        payment_use_cases: Arc::new(payment_use_cases),
        rate_limiter,
    };

    Ok((app_state, event_bus))
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agencias_billing=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs), skipped when the file cannot be created
    let json_layer = match File::create("app.log") {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true)
                .boxed(),
        ),
        Err(e) => {
            eprintln!("app.log unavailable, logging to console only: {e}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
