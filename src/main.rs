use log::{error, info};
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting notification hub [{}] v{}",
        config.runtime_env(),
        env!("CARGO_PKG_VERSION")
    );

    let app_state = AppState::new(config);
    let hub = app_state.hub.clone();

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        hub.close();
        std::process::exit(1);
    }

    // The shutdown signal already closed the hub; this covers any other exit path.
    hub.close();
    info!("Notification hub shut down");
}
