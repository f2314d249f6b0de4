//! API Routes
//!
//! - `/api/chat` - Ask a question within a session
//! - `/api/chat/{id}/history` - Read or clear a session's turns
//! - `/api/health` - Health checks

pub mod chat;
pub mod health;

use crate::middleware::apply_cors;
use crate::models::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let api_router = Router::new()
        .merge(chat::router(state.clone()))
        .merge(health::router(state))
        .layer(TraceLayer::new_for_http());

    apply_cors(api_router)
}
