//! WebSocket endpoint assembly.
//!
//! The gateway exposes a single long-lived `/ws` route plus a liveness
//! probe; all shared dependencies arrive through [`GatewayState`], built by
//! the composition root in `recipe-server`.

mod handler;
mod state;

pub use handler::ws_handler;
pub use state::GatewayState;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Routes served by the gateway
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(|| async { "OK" }))
}

/// Assemble the gateway application with request tracing
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
