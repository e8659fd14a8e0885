//! HrLink - internal HR directory service
//!
//! Main entry point for the HTTP server.

use anyhow::Context;
use hrlink_api::utils::logging;
use hrlink_api::{router, AppContext};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let (config, source) =
        hrlink_infra::config::load_with_source().context("failed to load configuration")?;
    logging::init(&config.logging)?;

    info!(%source, "configuration loaded");
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(%err, "no .env file loaded"),
    }

    let cancel = CancellationToken::new();
    let ctx = AppContext::from_config(&config, cancel.clone())?;
    let app = router(ctx);

    let addr = config.server.bind_address();
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        vendor = %config.vendor.base_url,
        inbound_auth = config.server.api_key.is_some(),
        "hrlink api listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(cancel)).await?;

    info!("hrlink api stopped");
    Ok(())
}

/// Resolves on Ctrl-C after cancelling in-flight vendor calls.
async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
    cancel.cancel();
}
