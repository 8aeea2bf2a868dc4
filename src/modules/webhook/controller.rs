use axum::{
    Json,
    extract::{Path, State},
};
use schoolbot_core::errors::AppError;
use schoolbot_models::UserIdentity;
use tracing::{debug, instrument};

use crate::conversation::router::Conversation;
use crate::modules::webhook::model::{EventRequest, EventResponse, OutboxResponse};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Feed one chat event into the conversation engine.
///
/// Conversational failures come back as replies with status 200; only a
/// malformed body is rejected.
#[instrument(skip(state, request), fields(from = %request.from))]
pub async fn post_event(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let replies = Conversation::handle(&state, request.into()).await;
    debug!(replies = replies.len(), "Event handled");
    Ok(Json(EventResponse { replies }))
}

/// Hand the queued notifications for one recipient to the transport adapter.
#[instrument(skip(state))]
pub async fn drain_outbox(
    State(state): State<AppState>,
    Path(identity): Path<i64>,
) -> Json<OutboxResponse> {
    let identity = UserIdentity(identity);
    let messages = state.outbox.drain(identity).await;
    Json(OutboxResponse { identity, messages })
}
