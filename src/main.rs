use std::sync::Arc;

use rank_probe::{
    AppState,
    api::routes::create_router,
    browser::WebDriverLauncher,
    config::Config,
    tracker::RankTracker,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true)
        .init();

    let server_addr = config.server_addr;
    tracing::info!(
        webdriver = %config.webdriver_url,
        keyword_delay = ?config.tracker.keyword_delay,
        host_interval = ?config.tracker.host_interval,
        "starting rank probe"
    );

    let launcher = WebDriverLauncher::new(config.webdriver_url.clone());
    let tracker = RankTracker::new(launcher, config.tracker.clone());

    let app_state = AppState {
        config: Arc::new(config),
        tracker: Arc::new(tracker),
    };

    let app = create_router(app_state);
    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("listening on {}", server_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
