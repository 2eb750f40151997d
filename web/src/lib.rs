//! HTTP transport for the notification hub.
//!
//! Exposes SSE endpoints that subscribe a connection to the hub and stream its
//! events until either side goes away, plus health and stats routes.

use axum::http::{HeaderValue, Method};
use log::*;
use service::config::Config;
use sse::Hub;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use service::AppState;

mod controller;
pub mod error;
mod response;
pub mod router;
mod stream;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let server_url = format!(
        "{}:{}",
        app_state.config.interface(),
        app_state.config.port
    );

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    let hub = Arc::clone(&app_state.hub);
    let cors = cors_layer(&app_state.config);
    let router = router::define_routes(app_state).layer(cors);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_credentials(true)
}

/// Waits for SIGINT or SIGTERM, then closes the hub. Closing cancels every
/// listener, which ends the open SSE streams so graceful shutdown can finish.
async fn shutdown_signal(hub: Arc<Hub>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    hub.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let config = Config::try_parse_from([
            "web-test",
            "--allowed-origins",
            "http://localhost:3000,bad\norigin",
        ])
        .unwrap();

        // Building the layer must not panic on the invalid entry.
        let _cors = cors_layer(&config);
    }
}
