pub mod config;
pub mod error;
pub mod playback;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Extension, Router};
use tower_http::cors::{Any, CorsLayer};

use config::Config;
use store::GameStore;

/// JSON envelope allowance on top of the PGN text itself.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Build the application router over shared state.
pub fn build_router(store: Arc<GameStore>, config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Libraries
        .route(
            "/api/libraries",
            get(routes::libraries::list_libraries).post(routes::libraries::create_library),
        )
        .route("/api/libraries/{id}", get(routes::libraries::get_library))
        .route("/api/libraries/{id}/games/{game}", get(routes::libraries::get_game))
        .route(
            "/api/libraries/{id}/games/{game}/snapshot",
            get(routes::libraries::get_snapshot),
        )
        .route(
            "/api/libraries/{id}/games/{game}/evaluation",
            get(routes::libraries::get_evaluation),
        )
        // Playback
        .route("/ws/playback/{id}/{game}", get(routes::playback_ws::ws_handler))
        // Shared state
        .layer(DefaultBodyLimit::max(config.max_pgn_bytes + BODY_OVERHEAD))
        .layer(Extension(store))
        .layer(Extension(config))
        .layer(cors)
}
