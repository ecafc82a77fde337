//! # Till Server
//!
//! HTTP JSON API over the Till POS catalog, checkout and dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Server                                    │
//! │                                                                         │
//! │  Browser UI ───► HTTP (8080) ───► routes ───► till-db ───► SQLite       │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                                 till-core                               │
//! │                        (validation, invoice, dashboard)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use till_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use crate::config::{ConfigError, ServerConfig};
pub use crate::error::{ApiError, ApiResult};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Arc<Self> {
        Arc::new(AppState { db, config })
    }
}

/// Builds the full application router with its middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = state.config.request_timeout();

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
