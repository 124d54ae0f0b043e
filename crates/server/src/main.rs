//! Photogram server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use photogram_api::{auth_middleware, middleware::AppState, router as api_router};
use photogram_common::Config;
use photogram_core::{FollowService, NotificationService, UserService};
use photogram_db::repositories::{
    FollowRepository, FollowRequestRepository, NotificationRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photogram=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting photogram server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(photogram_db::init(&config.database).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    photogram_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(db.clone());
    let follow_repo = FollowRepository::new(db.clone());
    let follow_request_repo = FollowRequestRepository::new(db.clone());
    let notification_repo = NotificationRepository::new(db.clone());

    // Services
    let user_service = UserService::new(user_repo.clone());
    let notification_service =
        NotificationService::new(notification_repo, user_repo.clone());
    let follow_service = FollowService::new(
        follow_repo,
        follow_request_repo,
        user_repo,
        notification_service.clone(),
    );

    let state = AppState {
        user_service,
        follow_service,
        notification_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
