/**
 * Backend Error Types
 *
 * This module defines the error taxonomy used by every coordinator
 * operation, HTTP handler and socket request.
 *
 * # Error Categories
 *
 * | Variant            | Category            | Status | Retryable |
 * |--------------------|---------------------|--------|-----------|
 * | `Validation`       | `validation`        | 400    | no        |
 * | `Unauthorized`     | `unauthorized`      | 401    | no        |
 * | `Forbidden`        | `forbidden`         | 403    | no        |
 * | `NotFound`         | `not_found`         | 404    | no        |
 * | `Conflict`         | `conflict`          | 409    | yes       |
 * | `StoreUnavailable` | `store_unavailable` | 503    | yes       |
 *
 * Malformed payloads arrive as `SharedError::ValidationError` and are
 * reported under the `validation` category as well.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::guard::Reason;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// Every variant maps to one category, one HTTP status and one retry hint.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed input, out-of-range positions, non-member assignees
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Offending field, in the wire casing clients send
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Caller identity could not be established
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Caller is known but the guard denied the action
    #[error("Forbidden: {reason}")]
    Forbidden { reason: Reason },

    /// Concurrent mutation could not be reconciled after retries
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Durable store unreachable or timed out
    #[error("Store unavailable: {0}")]
    StoreUnavailable(StoreError),

    /// Shared error (payload validation or decoding)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(constraint) => {
                tracing::debug!("[Store] Unique constraint {} rejected a write", constraint);
                Self::validation("email", "email is already registered")
            }
            other => Self::StoreUnavailable(other),
        }
    }
}

impl BackendError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(reason: Reason) -> Self {
        Self::Forbidden { reason }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable category name reported to clients
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } | Self::SharedError(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Conflict { .. } => "conflict",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::SerializationError(_) => "serialization",
        }
    }

    /// Whether repeating the same request may succeed
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::StoreUnavailable(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Validation { .. } | Self::NotFound { .. } => self.to_string(),
            Self::Unauthorized { message } | Self::Conflict { message } => message.clone(),
            Self::Forbidden { reason } => reason.to_string(),
            Self::StoreUnavailable(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
