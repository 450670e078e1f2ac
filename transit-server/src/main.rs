use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::cache::{CacheConfig, MokaBackend};
use transit_server::config::ServerConfig;
use transit_server::planner::SearchConfig;
use transit_server::service::TransitService;
use transit_server::snapshot::JsonFileSnapshot;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    // Load the route/stop snapshot (fail fast if unavailable)
    let snapshot = JsonFileSnapshot::open(&config.data_file)
        .await
        .expect("Failed to load transit data");
    let snapshot = Arc::new(snapshot);

    let cache_config = CacheConfig::default();
    let backend = Arc::new(MokaBackend::new(&cache_config));

    let mut search_config = SearchConfig::default();
    if let Some(timeout) = config.search_timeout {
        search_config = search_config.with_timeout(timeout);
    }

    let transit = TransitService::new(snapshot, backend, cache_config).with_search_config(search_config);
    let state = AppState::new(transit);

    // Warm the graph so the first request does not pay for the build
    if let Err(e) = state.transit.graph().await {
        warn!(error = %e, "Initial graph build failed");
    }

    // Spawn background task to re-read the data file
    let reload_state = state.clone();
    let reload_interval = config.reload_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(reload_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match reload_state.transit.snapshot().reload().await {
                Ok(routes) => {
                    reload_state.transit.invalidate_snapshot().await;
                    info!(routes, "Reloaded transit data");
                }
                Err(e) => error!(error = %e, "Failed to reload transit data"),
            }
        }
    });

    let app = create_router(state);

    info!(addr = %config.bind_addr, data = %config.data_file.display(), "Transit server listening");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
