//! HTTP server for the taskboard backend.
//!
//! Routes validate their bodies into domain values and hand them to a
//! [`BoardOperations`](taskboard_domain::BoardOperations) implementation held
//! in [`AppState`]. The default implementation, [`BoardContext`], runs each
//! mutation as one atomic unit of work against the configured document store.

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post, put},
    Router,
};
use taskboard_core::{AppConfig, TaskboardResult};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod context;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use context::BoardContext;
pub use error::AppError;
pub use state::AppState;

use routes::*;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/boards", post(create_board_handler).get(list_boards_handler))
        .route("/boards/supports/moving_cards", put(move_card_handler))
        .route("/boards/:id", get(get_board_handler).put(update_board_handler))
        .route("/columns", post(create_column_handler))
        .route(
            "/columns/:id",
            put(update_column_handler).delete(delete_column_handler),
        )
        .route("/cards", post(create_card_handler))
        .route(
            "/cards/:id",
            get(get_card_handler)
                .put(update_card_handler)
                .delete(delete_card_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> TaskboardResult<()> {
    info!("Initializing state...");
    let state = AppState::from_config(&config).await?;
    let app = router(state);

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    info!("Server running on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
