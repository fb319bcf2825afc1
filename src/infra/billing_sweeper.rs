use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info};

use crate::application::use_cases::subscription::SubscriptionUseCases;

/// Periodically expires lapsed subscriptions and grace windows.
pub async fn run_billing_sweep_loop(subscriptions: Arc<SubscriptionUseCases>, every_secs: u64) {
    let mut ticker = interval(Duration::from_secs(every_secs));

    info!("Billing sweeper started (every {}s)", every_secs);

    loop {
        ticker.tick().await;

        match subscriptions.sweep(Utc::now()).await {
            Ok(report) if report.moved_to_pending + report.blocked + report.failed > 0 => {
                info!(
                    moved_to_pending = report.moved_to_pending,
                    blocked = report.blocked,
                    failed = report.failed,
                    "Billing sweep finished"
                );
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Billing sweep failed"),
        }
    }
}
