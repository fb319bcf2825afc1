use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use super::InfraError;

pub struct AppConfig {
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Only enable behind a reverse proxy.
    pub trust_proxy: bool,
    /// Asaas API base, e.g. `https://sandbox.asaas.com/api/v3`.
    pub asaas_api_url: Url,
    pub asaas_api_key: SecretString,
    /// Expected value of the `asaas-access-token` header on webhooks.
    pub asaas_webhook_token: SecretString,
    pub gateway_timeout_secs: u64,
    pub trial_days: i64,
    pub grace_period_days: i64,
    /// Default due date offset for new charges.
    pub pix_due_days: i64,
    pub access_cache_ttl_secs: u64,
    pub access_cache_max_entries: u64,
    pub billing_sweep_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let database_url: String = get_env("DATABASE_URL");
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 120);
        // Default to false - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        let asaas_api_url: Url = get_env("ASAAS_API_URL");
        let asaas_api_key = SecretString::new(get_env::<String>("ASAAS_API_KEY").into());
        let asaas_webhook_token =
            SecretString::new(get_env::<String>("ASAAS_WEBHOOK_TOKEN").into());
        let gateway_timeout_secs: u64 = get_env_default("GATEWAY_TIMEOUT_SECS", 15);

        let trial_days: i64 = get_env_default("TRIAL_DAYS", 30);
        let grace_period_days: i64 = get_env_default("GRACE_PERIOD_DAYS", 5);
        let pix_due_days: i64 = get_env_default("PIX_DUE_DAYS", 3);
        let access_cache_ttl_secs: u64 = get_env_default("ACCESS_CACHE_TTL_SECS", 120);
        let access_cache_max_entries: u64 = get_env_default("ACCESS_CACHE_MAX_ENTRIES", 10_000);
        let billing_sweep_seconds: u64 = get_env_default("BILLING_SWEEP_SECONDS", 3600);

        if trial_days <= 0 {
            return Err(InfraError::ConfigInvalid { var: "TRIAL_DAYS" });
        }
        if grace_period_days < 0 {
            return Err(InfraError::ConfigInvalid {
                var: "GRACE_PERIOD_DAYS",
            });
        }
        if gateway_timeout_secs == 0 {
            return Err(InfraError::ConfigInvalid {
                var: "GATEWAY_TIMEOUT_SECS",
            });
        }
        if billing_sweep_seconds == 0 {
            return Err(InfraError::ConfigInvalid {
                var: "BILLING_SWEEP_SECONDS",
            });
        }

        Ok(Self {
            cors_origin,
            bind_addr,
            database_url,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
            asaas_api_url,
            asaas_api_key,
            asaas_webhook_token,
            gateway_timeout_secs,
            trial_days,
            grace_period_days,
            pix_due_days,
            access_cache_ttl_secs,
            access_cache_max_entries,
            billing_sweep_seconds,
        })
    }
}
