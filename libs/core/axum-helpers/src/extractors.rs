//! JSON body extractor that reports failures with [`ErrorResponse`].

use crate::errors::ErrorResponse;
use axum::{
    extract::{FromRequest, Json, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes and validates a JSON body.
///
/// A body that is missing, malformed or of the wrong shape keeps the status
/// axum assigns it (400, 415 or 422) but is returned as the shared JSON
/// error body. Failed `validator` rules give a 400 with per-field details.
///
/// ```ignore
/// async fn set_key(ValidatedJson(input): ValidatedJson<SetCredential>) -> String {
///     input.api_key
/// }
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
            .map_err(rejection_response)?;

        data.validate().map_err(|e| {
            let details = e
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let messages: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|err| {
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

            let body = ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "Request validation failed",
            )
            .with_details(serde_json::Value::Object(details));

            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })?;

        Ok(ValidatedJson(data))
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    tracing::debug!(%status, error = %rejection.body_text(), "Rejected JSON body");

    let body = ErrorResponse::new(status, "InvalidBody", rejection.body_text());
    (status, Json(body)).into_response()
}
