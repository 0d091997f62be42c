use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use errand_api::config::{LogFormat, ServerConfig};
use errand_api::notifications::NotificationPushRouter;
use errand_api::router::build_app_router;
use errand_api::state::AppState;
use errand_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let (json_layer, pretty_layer) = match LogFormat::from_env() {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer())),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "errand_api=debug,tower_http=debug".into()),
        )
        .with(json_layer)
        .with(pretty_layer)
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = errand_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(max_connections = config.db_max_connections, "Database connection pool created");

    errand_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    errand_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Presence + heartbeat ---
    let presence = Arc::new(ws::PresenceRegistry::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&presence));

    // --- Event bus ---
    let event_bus = Arc::new(errand_events::EventBus::default());
    let push_router = NotificationPushRouter::new(Arc::clone(&presence));
    let push_handle = tokio::spawn(push_router.run(event_bus.subscribe()));
    tracing::info!("Event bus and notification push router started");

    // --- App state ---
    let config = Arc::new(config);
    let state = AppState::new(
        pool,
        Arc::clone(&config),
        Arc::clone(&event_bus),
        Arc::clone(&presence),
    );
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    // Closing the sockets ends their tasks and releases their state clones.
    tracing::info!(
        connections = presence.connection_count(),
        "Closing remaining WebSocket connections"
    );
    presence.shutdown_all();
    heartbeat_handle.abort();

    // Once every bus handle is gone the push router drains and exits.
    drop(event_bus);
    if tokio::time::timeout(drain, push_handle).await.is_err() {
        tracing::warn!("Notification push router did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
