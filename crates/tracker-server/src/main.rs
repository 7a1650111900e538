use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracker_server::config::AppConfig;
use tracker_server::service::{CacheTtls, TraderService};
use tracker_server::source::PolymarketClient;
use tracker_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker=info,tracker_server=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("            TRACKER - Starting Up               ");
    println!("================================================");

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] Data API: {}", config.upstream.data_api_url);
    println!("[CONFIG] Upstream timeout: {}s", config.upstream.timeout_seconds);
    println!("[CONFIG] Cache capacity: {} entries per cache", config.cache.max_capacity);

    let ttls = CacheTtls::default();
    tracing::info!(
        performance_ttl_s = ttls.performance.as_secs(),
        positions_ttl_s = ttls.positions.as_secs(),
        stats_ttl_s = ttls.stats.as_secs(),
        "Cache TTLs"
    );

    let client = PolymarketClient::new(&config.upstream)?;
    let service = TraderService::new(Arc::new(client), ttls, config.cache.max_capacity);
    let app = tracker_server::app(AppState { service });

    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Server listening on http://{}", addr);
    println!("  Routes: /health, /traders/{{address}}[/performance|/positions]");
    println!("================================================");

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
