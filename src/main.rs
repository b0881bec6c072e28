use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trade_prompt_proxy::{api, config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    config::Config::dotenv_load();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::new()?;
    config::Config::print_env_vars();

    let state = Arc::new(api::AppState::from_config(&config)?);
    tracing::info!(
        backends = ?state.chain.backend_names(),
        image_providers = ?state.images.provider_names(),
        "Fallback order"
    );
    let app = api::router(state);

    // Run our application with safe parsing
    let host_str = config.api_host.clone();
    let port_str = config.api_port.clone();
    let ip: std::net::IpAddr = host_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_HOST '{}', falling back to 127.0.0.1", host_str);
        std::net::IpAddr::from([127, 0, 0, 1])
    });
    let port: u16 = port_str.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid API_PORT '{}', falling back to 3000", port_str);
        3000
    });
    let socket_address = SocketAddr::new(ip, port);
    tracing::info!("listening on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
