use std::net::SocketAddr;

use laoslip_server::config::ServerConfig;
use laoslip_server::{router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    let addr = SocketAddr::new(config.host, config.port);
    let app = router(AppState::from_config(&config));

    let listener = TcpListener::bind(addr).await?;
    info!(backend = ?config.backend, "Lao Slip OCR API listening on {addr}");
    info!("Health check: http://{addr}/health");
    info!("OCR endpoint: POST http://{addr}/ocr/slip");

    axum::serve(listener, app).await?;
    Ok(())
}
