//! JSON extractor with validation through the validator crate.

use crate::errors::{AppError, ErrorCode, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that runs `Validate::validate` after deserializing.
///
/// A body that fails to parse is rejected through [`AppError`]; a body that
/// parses but fails validation gets a 400 whose `message` is the first field
/// message and whose `details` carry every field error.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct LoginRequest {
///     #[validate(email(message = "Please provide a valid email"))]
///     email: String,
/// }
///
/// async fn login(ValidatedJson(payload): ValidatedJson<LoginRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| validation_response(&e))?;

        Ok(ValidatedJson(data))
    }
}

fn validation_response(errors: &ValidationErrors) -> Response {
    let mut first_message = None;

    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    if first_message.is_none() {
                        first_message = err.message.as_ref().map(|m| m.to_string());
                    }
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::json!(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    let message = first_message
        .unwrap_or_else(|| ErrorCode::ValidationError.default_message().to_string());
    let body = ErrorResponse::new(ErrorCode::ValidationError, message)
        .with_details(serde_json::Value::Object(details));

    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
}
