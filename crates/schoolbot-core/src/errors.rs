use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Message shown to a user when an internal failure swallowed the details.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// Message shown to an actor whose single-recipient message bounced.
pub const DELIVERY_FAILURE: &str = "Message could not be delivered.";

/// Coarse classification of an [`AppError`].
///
/// Conversational handlers turn every kind except [`ErrorKind::Internal`]
/// into a reply carrying the error text; internal errors are logged and the
/// user only sees [`GENERIC_FAILURE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty input, malformed id, bad score.
    Validation,
    /// Duplicate link, already pending, self-demotion.
    Conflict,
    /// Unknown id or a request that was already resolved.
    NotFound,
    /// The actor lacks the role for the operation.
    Forbidden,
    /// A recipient could not be reached.
    Delivery,
    /// Persistence or other unexpected failure.
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Delivery => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Conflict, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Forbidden, err)
    }

    pub fn delivery<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Delivery, err)
    }

    /// The stale-button / already-resolved error used by every approval action.
    pub fn request_not_found() -> Self {
        Self::not_found(anyhow::anyhow!("Request not found."))
    }

    /// Whether the error text may be shown to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self.kind, ErrorKind::Internal)
    }

    /// Text to reply with. Internal errors are logged here and hidden.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Internal => {
                tracing::error!(error = %self.error, "Internal error while handling event");
                GENERIC_FAILURE.to_string()
            }
            ErrorKind::Delivery => DELIVERY_FAILURE.to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_user_facing() {
            self.error.to_string()
        } else {
            tracing::error!(error = %self.error, "Internal error");
            GENERIC_FAILURE.to_string()
        };
        let body = Json(json!({
            "error": message
        }));

        (self.kind.status(), body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(
            AppError::validation(anyhow::anyhow!("x")).kind,
            ErrorKind::Validation
        );
        assert_eq!(
            AppError::conflict(anyhow::anyhow!("x")).kind,
            ErrorKind::Conflict
        );
        assert_eq!(AppError::request_not_found().kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::internal(anyhow::anyhow!("disk on fire"));
        assert!(!err.is_user_facing());
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_user_message_shows_validation_text() {
        let err = AppError::validation(anyhow::anyhow!("Name must not be empty."));
        assert_eq!(err.user_message(), "Name must not be empty.");
    }

    #[test]
    fn test_delivery_message_is_generic() {
        let err = AppError::delivery(anyhow::anyhow!("chat 42 blocked the bot"));
        assert_eq!(err.user_message(), DELIVERY_FAILURE);
    }

    #[test]
    fn test_from_io_error_is_internal() {
        let io = std::io::Error::other("boom");
        let err: AppError = io.into();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
