use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers::*;

pub fn create_router(state: Arc<GatewayApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/reference", post(reference_handler))
        .route("/volatility-surface/:pair", post(surface_handler))
        .with_state(state)
}
