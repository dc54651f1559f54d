use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::error::AppError;

/// JSON body extractor that rejects with the `ApiResponse` error envelope
/// and runs `validator` rules before the handler sees the value.
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
            .map_err(json_rejection_to_error)?;

        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self(value))
    }
}

fn json_rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            AppError::Validation(format!("Invalid JSON data: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            AppError::BadRequest(format!("Invalid JSON syntax: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::BadRequest("Expected Content-Type: application/json".to_string())
        }
        other => AppError::BadRequest(other.body_text()),
    }
}
