//! HTTP routes
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | /contacts | list |
//! | POST | /contacts | create |
//! | GET | /contacts/{id} | get by id |
//! | PATCH | /contacts/{id} | patch |
//! | PUT | /contacts/{id} | upsert |
//! | DELETE | /contacts/{id} | delete |
//! | GET | /health, /ready | probes, no identity required |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::{
    error::Result,
    handlers::{contacts, contact_query, ApiError, JsonBody, QueryParams, Reply},
    health::{health, readiness},
    middleware::{AuthUser, TrustedIdentity},
    repository::{Contact, ContactPatch, ContactsPage, NewContact},
    state::AppState,
};

pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";

/// Build the full application router
///
/// Contact routes sit behind [`TrustedIdentity`] configured from
/// `identity.user_header`; the probes and the fallback do not.
pub fn router(state: AppState) -> Result<Router> {
    let identity = TrustedIdentity::from_config(&state.config().identity)?;

    let contact_routes = Router::new()
        .route("/contacts", get(list).post(create))
        .route(
            "/contacts/{id}",
            get(get_by_id).patch(patch).put(upsert).delete(remove),
        )
        .route_layer(from_fn_with_state(identity, TrustedIdentity::middleware));

    Ok(Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .merge(contact_routes)
        .fallback(route_not_found)
        .with_state(state))
}

async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<QueryParams>,
) -> std::result::Result<Reply<ContactsPage>, ApiError> {
    let query = contact_query(user, &params, &state.config().pagination);
    contacts::list_contacts(state.contacts(), query).await
}

async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> std::result::Result<Reply<Contact>, ApiError> {
    contacts::get_contact_by_id(state.contacts(), &user, &id).await
}

async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<JsonBody<NewContact>, ApiError>,
) -> std::result::Result<Reply<Contact>, ApiError> {
    let payload = payload.map(|JsonBody(payload)| payload);
    contacts::create_contact(state.contacts(), &user, payload).await
}

async fn patch(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    patch: std::result::Result<JsonBody<ContactPatch>, ApiError>,
) -> std::result::Result<Reply<Contact>, ApiError> {
    let patch = patch.map(|JsonBody(patch)| patch);
    contacts::patch_contact(state.contacts(), &user, &id, patch).await
}

async fn upsert(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    patch: std::result::Result<JsonBody<ContactPatch>, ApiError>,
) -> std::result::Result<Reply<Contact>, ApiError> {
    let patch = patch.map(|JsonBody(patch)| patch);
    contacts::upsert_contact(state.contacts(), &user, &id, patch).await
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> std::result::Result<Reply<()>, ApiError> {
    contacts::delete_contact(state.contacts(), &user, &id).await
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": ROUTE_NOT_FOUND_MESSAGE })),
    )
}
