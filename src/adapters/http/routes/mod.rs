mod access;
mod common;
mod health;
mod payments;
mod plans;
mod subscriptions;
mod webhooks;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/subscriptions", subscriptions::router())
        .nest("/plans", plans::router())
        .nest("/access", access::router())
        .nest("/payments", payments::router())
        .nest("/webhooks", webhooks::router())
        .merge(health::router())
}
