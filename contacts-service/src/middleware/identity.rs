//! Requesting-user identity
//!
//! Handlers never authenticate anyone. They read an [`AuthUser`] from the
//! request extensions, and whatever sits in front of them is responsible for
//! putting it there. [`TrustedIdentity`] is the bundled option: it trusts a
//! header set by an authenticating proxy.

use std::str::FromStr;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderName},
    middleware::Next,
    response::Response,
};

use crate::{
    config::IdentityConfig,
    error::{Error, Result},
    handlers::ApiError,
    ids::UserId,
};

/// The user a request acts on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Middleware that takes the user id from a trusted request header
#[derive(Debug, Clone)]
pub struct TrustedIdentity {
    header: HeaderName,
}

impl TrustedIdentity {
    /// Trust `header`; fails if it is not a valid header name
    pub fn new(header: &str) -> Result<Self> {
        let header = HeaderName::from_str(header.trim()).map_err(|err| {
            Error::InvalidConfig(format!("identity.user_header '{header}' is invalid: {err}"))
        })?;
        Ok(Self { header })
    }

    pub fn from_config(config: &IdentityConfig) -> Result<Self> {
        Self::new(&config.user_header)
    }

    #[must_use]
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Resolve the header into an [`AuthUser`] extension
    ///
    /// Missing or malformed (not 24 hex characters) values are rejected with
    /// a 401 before the handler runs.
    pub async fn middleware(
        State(identity): State<Self>,
        mut request: Request<Body>,
        next: Next,
    ) -> std::result::Result<Response, ApiError> {
        let raw = request
            .headers()
            .get(&identity.header)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| UserId::parse(value.trim()).ok())
            .ok_or_else(|| ApiError::unauthorized("Invalid user identity"))?;

        request.extensions_mut().insert(AuthUser(user_id));

        Ok(next.run(request).await)
    }
}
