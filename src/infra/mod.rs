use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod access_cache;
pub mod app;
pub mod asaas_client;
pub mod billing_sweeper;
pub mod config;
pub mod db;
pub mod error;
pub mod event_bus;
pub mod http_client;
pub mod rate_limit;
pub mod setup;

pub use error::InfraError;
pub use rate_limit::{RateLimiterTrait, RedisRateLimiter};

pub async fn postgres_persistence(database_url: &str) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(database_url).await?;
    Ok(PostgresPersistence::new(pool))
}
