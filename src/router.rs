use crate::logging::logging_middleware;
use crate::modules::webhook::router::init_webhook_router;
use crate::state::AppState;
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", init_webhook_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
}
