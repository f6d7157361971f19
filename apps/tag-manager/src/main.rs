use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tag_manager::api::{self, AppState};
use tag_manager::config::{ServerSettings, TagConfig};
use tag_manager::game::TagManager;
use tag_manager::infrastructure::GameDriver;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let settings = ServerSettings::from_env();

    // Load the game config block
    let (config, warnings) = match &settings.config_path {
        Some(path) => TagConfig::load(path),
        None => (TagConfig::default(), Vec::new()),
    };
    for warning in &warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    tracing::info!(
        tag_range = config.rules.tag_range,
        tag_min_interval = config.rules.min_interval,
        tag_duration = config.rules.duration,
        human_platform = %config.human_platform,
        "Tag manager configured"
    );

    let mut manager = TagManager::new(config);
    manager.note_config_warnings(warnings.len());

    // Start the cycle loop
    let (driver, handle) = GameDriver::new(manager, settings.tick_interval);
    let driver_task = driver.spawn();

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::router(AppState::new(handle.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Server listening on {}", settings.bind_addr);

    let listener = match tokio::net::TcpListener::bind(settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", settings.bind_addr, e);
            handle.shutdown();
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server failed: {}", e);
    }

    handle.shutdown();
    if let Err(e) = driver_task.await {
        tracing::error!("Cycle loop ended abnormally: {}", e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
