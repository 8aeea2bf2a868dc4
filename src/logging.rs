use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Access log for the webhook surface. Bodies are never logged since they
/// carry chat text.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let request_id = Uuid::new_v4();

    let span = info_span!("request", %request_id, %method, %path);
    async move {
        debug!("Incoming request");
        let response = next.run(req).await;
        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if status.is_server_error() {
            error!(status = status.as_u16(), latency_ms, "Server error");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), latency_ms, "Client error");
        } else {
            info!(status = status.as_u16(), latency_ms, "Request completed");
        }
        response
    }
    .instrument(span)
    .await
}
