/**
 * Error Conversion
 *
 * Converts backend errors into HTTP responses, and axum extractor
 * rejections into backend errors.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Forbidden: private_board",
 *   "category": "forbidden",
 *   "retryable": false,
 *   "status": 403
 * }
 * ```
 */

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::backend::error::types::BackendError;

impl BackendError {
    /// JSON body sent with every error response
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.message(),
            "category": self.category(),
            "retryable": self.retryable(),
            "status": self.status_code().as_u16(),
        })
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Error] {} ({})", self.message(), self.category());
        } else {
            tracing::debug!("[Error] {} ({})", self.message(), self.category());
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        BackendError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        BackendError::validation("path", rejection.body_text())
    }
}

/// JSON body extractor reporting malformed payloads as validation errors
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path extractor reporting malformed ids as validation errors
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
