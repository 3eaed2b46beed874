//! BloomWatch HTTP Server Binary
//!
//! This is the main entry point for the BloomWatch REST API server.
//! It loads the configuration, initializes the history store, wires the
//! remote clients into the service layer, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory store (default when no store path is set)
//! cargo run --bin bloomwatch-server
//!
//! # Run with the JSON-file store
//! BLOOM_STORE_PATH=data/history.json cargo run --bin bloomwatch-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `BLOOM_CLIENT_ID` / `BLOOM_CLIENT_SECRET`: OAuth credentials
//! - `BLOOM_STORE_PATH`: history document path (file-store backend)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bloomwatch::config::AppConfig;
use bloomwatch::http::{create_router, AppState};
use bloomwatch::remote::{
    ProcessClient, RegionAggregator, ReverseGeocoder, StatisticsClient, TokenBroker,
};
use bloomwatch::services::{AnalysisService, PoiService};
use bloomwatch::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting BloomWatch analysis server");

    let config = AppConfig::load()?;
    if config.auth.client_id.is_empty() {
        info!("No OAuth client id configured; analysis requests will fail until one is set");
    }

    // Initialize the global store once and reuse it across the app
    store::init_store(&config.store).await?;
    let history = Arc::clone(store::get_store()?);
    info!("History store initialized");

    // One shared HTTP client for every remote component
    let client = reqwest::Client::new();
    let broker = Arc::new(TokenBroker::new(client.clone(), config.auth));
    let aggregator = RegionAggregator::new(
        StatisticsClient::new(client.clone(), config.statistics),
        ProcessClient::new(client.clone(), config.process),
    );
    let analysis = Arc::new(AnalysisService::new(broker, aggregator, history.clone()));
    let pois = Arc::new(PoiService::new(
        ReverseGeocoder::new(client, config.geocode),
        history.clone(),
    ));

    let state = AppState::new(analysis, pois, history, config.overlay);
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
