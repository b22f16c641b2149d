//! Success responses for contact handlers
//!
//! ```rust
//! use axum::{http::StatusCode, response::IntoResponse};
//! use contacts_service::handlers::Reply;
//!
//! let reply = Reply::created("Successfully created a contact!", 42);
//! assert_eq!(reply.into_response().status(), StatusCode::CREATED);
//!
//! assert_eq!(Reply::<()>::InvalidId.into_response().status(), StatusCode::NOT_FOUND);
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Message of the minimal body sent for malformed identifiers
pub const INVALID_ID_MESSAGE: &str = "Not found";

/// `{status, message, data}` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

/// What a contact handler answers with when it does not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// Status code plus enveloped payload
    Envelope(StatusCode, Envelope<T>),
    /// 204 with an empty body
    NoContent,
    /// 404 with exactly `{"message":"Not found"}`, for identifiers that are
    /// not 24 hex characters
    InvalidId,
}

impl<T> Reply<T> {
    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self::Envelope(
            status,
            Envelope {
                status: status.as_u16(),
                message: message.into(),
                data,
            },
        )
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    /// Status code this reply will be sent with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Envelope(status, _) => *status,
            Self::NoContent => StatusCode::NO_CONTENT,
            Self::InvalidId => StatusCode::NOT_FOUND,
        }
    }

    /// The enveloped payload, if any
    #[must_use]
    pub fn envelope(&self) -> Option<&Envelope<T>> {
        match self {
            Self::Envelope(_, envelope) => Some(envelope),
            Self::NoContent | Self::InvalidId => None,
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Envelope(status, envelope) => (status, Json(envelope)).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::InvalidId => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": INVALID_ID_MESSAGE })),
            )
                .into_response(),
        }
    }
}
