//! Request tracking middleware
//!
//! Request ID generation and echo, plus masking of headers that must not
//! show up in trace output.

use http::HeaderName;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::ids::MakeTypedRequestId;

/// Header carrying the request ID in both directions
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headers that are always masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Create a request ID layer that generates type-safe request IDs.
///
/// Example format: `req_01h455vb4pex5vsknk084sn02q`. An incoming
/// `x-request-id` is kept as is.
pub fn request_id_layer() -> SetRequestIdLayer<MakeTypedRequestId> {
    SetRequestIdLayer::x_request_id(MakeTypedRequestId)
}

/// Copy the request ID onto the response
pub fn request_id_propagation_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Mask [`SENSITIVE_HEADERS`] and any `extra` headers
///
/// The identity header is passed as `extra` so user ids stay out of request
/// spans.
pub fn sensitive_headers_layer(
    extra: impl IntoIterator<Item = HeaderName>,
) -> SetSensitiveRequestHeadersLayer {
    let headers: Vec<HeaderName> = SENSITIVE_HEADERS
        .iter()
        .copied()
        .map(HeaderName::from_static)
        .chain(extra)
        .collect();

    SetSensitiveRequestHeadersLayer::new(headers)
}
