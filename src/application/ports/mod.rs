pub mod access_cache;
pub mod payment_gateway;
pub mod subscription_events;
