use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use schoolbot_core::errors::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join(" ")
}

/// Validate a DTO, turning failures into a user-facing validation error.
pub fn validate_input<T: Validate>(value: &T) -> Result<(), AppError> {
    value
        .validate()
        .map_err(|errors| AppError::validation(anyhow!("{}", format_errors(&errors))))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::validation(anyhow!("{} is required", field));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::validation(anyhow!(
                        "Missing 'Content-Type: application/json' header"
                    ));
                }

                AppError::validation(anyhow!("Invalid event body"))
            })?;

        validate_input(&value)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Dto {
        #[validate(length(min = 1, message = "Name is required."))]
        name: String,
    }

    #[test]
    fn test_validate_input_uses_field_messages() {
        let err = validate_input(&Dto {
            name: String::new(),
        })
        .unwrap_err();
        assert_eq!(err.error.to_string(), "Name is required.");
        assert!(validate_input(&Dto { name: "x".into() }).is_ok());
    }
}
