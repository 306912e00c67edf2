//! Axum application setup
//!
//! Creates and configures the Axum application with routes and middleware.

use crate::{config::Settings, relay::ChatRelay};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Relay orchestrator handling chat forwarding
    pub relay: Arc<ChatRelay>,
    /// Application settings
    pub settings: Arc<Settings>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

/// Create the main Axum application with routes and middleware
pub fn create_app(settings: Settings) -> Router {
    let enable_cors = settings.server.enable_cors;
    let relay = Arc::new(ChatRelay::new(settings.clone()));

    let state = AppState {
        relay,
        settings: Arc::new(settings),
        start_time: std::time::Instant::now(),
    };

    let router = Router::new()
        .route("/chat", post(super::handlers::chat))
        .route("/", get(super::handlers::index))
        .route("/ping", get(super::handlers::ping))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
