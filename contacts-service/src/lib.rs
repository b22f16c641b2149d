//! # contacts-service
//!
//! Owner-scoped contacts REST service on axum. Every contact belongs to one
//! user, and every operation runs on behalf of the requesting user, so a
//! contact owned by someone else is indistinguishable from a missing one.
//!
//! ## Features
//!
//! - **CRUD handlers**: list (paginated, sorted, filtered), get, create, patch, upsert, delete
//! - **Explicit results**: handlers return `Result<Reply<T>, ApiError>`, rendered in one place
//! - **Pluggable storage**: [`repository::ContactRepository`] trait with an in-memory store
//! - **Middleware stack**: trusted-header identity, request IDs, panic recovery, body limits
//! - **Health checks**: liveness and readiness probes
//! - **Graceful shutdown**: SIGTERM and SIGINT
//!
//! ## Example
//!
//! ```rust,no_run
//! use contacts_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::in_memory(config.clone());
//!     let app = router(state)?;
//!
//!     Server::new(config).serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod repository;
pub mod routes;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, IdentityConfig, LogFormat, PaginationConfig};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation, JsonBody, Reply};
    pub use crate::health::{health, readiness};
    pub use crate::ids::{ContactId, ObjectId, RequestId, UserId};
    pub use crate::middleware::{AuthUser, TrustedIdentity};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Contact, ContactPatch, ContactQuery, ContactRepository, ContactsPage,
        InMemoryContactStore, NewContact, RepositoryError,
    };
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::AppState;

    pub use axum::Router;
}
