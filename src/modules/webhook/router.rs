use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{drain_outbox, post_event};

pub fn init_webhook_router() -> Router<AppState> {
    Router::new()
        .route("/events", post(post_event))
        .route("/outbox/{identity}", get(drain_outbox))
}
