use dotenvy::dotenv;
use tracing::info;

use agencias_billing::infra::{
    InfraError,
    app::create_app,
    billing_sweeper::run_billing_sweep_loop,
    event_bus::run_event_logger,
    setup::{init_app_state, init_tracing},
};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let (app_state, event_bus) = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;
    let sweep_every = app_state.config.billing_sweep_seconds;

    let app = create_app(app_state.clone());

    tokio::spawn(run_event_logger(event_bus.subscribe()));

    // Expire lapsed subscriptions and grace windows in the background
    let subscription_use_cases = app_state.subscription_use_cases.clone();
    tokio::spawn(async move {
        run_billing_sweep_loop(subscription_use_cases, sweep_every).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Billing API listening at {}", &listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(InfraError::Server)?;

    Ok(())
}
