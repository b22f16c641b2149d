//! Contact request handlers and their building blocks
//!
//! - [`contacts`]: one orchestration function per contact operation
//! - [`ApiError`]: the single error type handlers return
//! - [`Reply`]: success bodies (envelope, no content, minimal not-found)
//! - [`query`]: lenient parsers for list query strings
//! - [`JsonBody`]: JSON extractor whose rejections use the error envelope

use axum::extract::FromRequest;

pub mod contacts;
mod error;
pub mod query;
mod response;

pub use error::{ApiError, ApiErrorDetails, ApiErrorKind, ApiErrorResponse, ApiOperation};
pub use query::{
    contact_query, parse_filter_params, parse_pagination_params, parse_sort_params, QueryParams,
};
pub use response::{Envelope, Reply, INVALID_ID_MESSAGE};

/// `axum::Json` whose rejections render as an [`ApiError`] envelope
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
