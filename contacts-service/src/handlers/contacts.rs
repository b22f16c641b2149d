//! Contact operations
//!
//! One function per operation. Each takes the repository and the requesting
//! user explicitly and returns either a [`Reply`] or an [`ApiError`]; nothing
//! is written to the response here. Malformed identifiers are answered with
//! [`Reply::InvalidId`] before the repository is consulted.
//!
//! Request bodies arrive as the extraction result rather than the parsed
//! value. A body rejection is only returned once the identifier is valid.

use axum::http::StatusCode;

use super::error::{ApiError, ApiOperation};
use super::response::Reply;
use crate::ids::{ContactId, UserId};
use crate::repository::{
    Contact, ContactPatch, ContactQuery, ContactRepository, ContactsPage, NewContact,
    UpsertOptions,
};

pub const ENTITY: &str = "Contact";

pub const LIST_MESSAGE: &str = "Successfully found contacts!";
pub const CREATE_MESSAGE: &str = "Successfully created a contact!";
pub const PATCH_MESSAGE: &str = "Successfully patched a contact!";
pub const UPSERT_MESSAGE: &str = "Successfully upserted a contact!";
pub const CONTACT_NOT_FOUND: &str = "Contact not found";

pub async fn list_contacts(
    repo: &dyn ContactRepository,
    query: ContactQuery,
) -> Result<Reply<ContactsPage>, ApiError> {
    let page = repo.get_all_contacts(query).await?;
    tracing::debug!(
        user_id = %query.user_id,
        page = page.page,
        returned = page.data.len(),
        total = page.total_items,
        "listed contacts"
    );
    Ok(Reply::ok(LIST_MESSAGE, page))
}

pub async fn get_contact_by_id(
    repo: &dyn ContactRepository,
    user_id: &UserId,
    raw_id: &str,
) -> Result<Reply<Contact>, ApiError> {
    let Ok(id) = ContactId::parse(raw_id) else {
        return Ok(Reply::InvalidId);
    };

    match repo.get_contact_by_id(&id, user_id).await? {
        Some(contact) => Ok(Reply::ok(
            format!("Successfully found contact with id: {raw_id}!"),
            contact,
        )),
        None => Err(ApiError::not_found(
            ApiOperation::Get,
            format!("Contact with id {raw_id} not found!"),
        )
        .with_entity(ENTITY, raw_id)),
    }
}

/// Insert a contact; any owner named in `payload` is replaced by `user_id`
pub async fn create_contact(
    repo: &dyn ContactRepository,
    user_id: &UserId,
    payload: Result<NewContact, ApiError>,
) -> Result<Reply<Contact>, ApiError> {
    let payload = payload.map_err(|err| err.with_operation(ApiOperation::Create))?;
    let contact = repo.create_contact(payload.owned_by(*user_id)).await?;
    tracing::info!(contact_id = %contact.id, user_id = %user_id, "contact created");
    Ok(Reply::created(CREATE_MESSAGE, contact))
}

/// Update an existing contact; never creates one
pub async fn patch_contact(
    repo: &dyn ContactRepository,
    user_id: &UserId,
    raw_id: &str,
    patch: Result<ContactPatch, ApiError>,
) -> Result<Reply<Contact>, ApiError> {
    let Ok(id) = ContactId::parse(raw_id) else {
        return Ok(Reply::InvalidId);
    };
    let patch = patch.map_err(|err| err.with_operation(ApiOperation::Patch))?;

    let outcome = repo
        .upsert_contact(&id, user_id, patch, UpsertOptions::UPDATE_ONLY)
        .await
        .map_err(|err| ApiError::from(err).with_operation(ApiOperation::Patch))?;

    match outcome {
        Some(outcome) => {
            tracing::info!(contact_id = %id, user_id = %user_id, "contact patched");
            Ok(Reply::ok(PATCH_MESSAGE, outcome.contact))
        }
        None => Err(ApiError::not_found(ApiOperation::Patch, CONTACT_NOT_FOUND)
            .with_entity(ENTITY, raw_id)),
    }
}

/// Replace-or-create under a caller-chosen id
///
/// 201 when the contact was inserted, 200 when an existing one was updated.
pub async fn upsert_contact(
    repo: &dyn ContactRepository,
    user_id: &UserId,
    raw_id: &str,
    patch: Result<ContactPatch, ApiError>,
) -> Result<Reply<Contact>, ApiError> {
    let Ok(id) = ContactId::parse(raw_id) else {
        return Ok(Reply::InvalidId);
    };
    let patch = patch.map_err(|err| err.with_operation(ApiOperation::Upsert))?;

    let outcome = repo
        .upsert_contact(&id, user_id, patch, UpsertOptions::CREATE_OR_UPDATE)
        .await?;

    match outcome {
        Some(outcome) => {
            let status = if outcome.is_new {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            tracing::info!(contact_id = %id, user_id = %user_id, created = outcome.is_new, "contact upserted");
            Ok(Reply::with_status(status, UPSERT_MESSAGE, outcome.contact))
        }
        None => Err(ApiError::not_found(ApiOperation::Upsert, CONTACT_NOT_FOUND)
            .with_entity(ENTITY, raw_id)),
    }
}

pub async fn delete_contact(
    repo: &dyn ContactRepository,
    user_id: &UserId,
    raw_id: &str,
) -> Result<Reply<()>, ApiError> {
    let Ok(id) = ContactId::parse(raw_id) else {
        return Ok(Reply::InvalidId);
    };

    match repo.delete_contact(&id, user_id).await? {
        Some(_) => {
            tracing::info!(contact_id = %id, user_id = %user_id, "contact deleted");
            Ok(Reply::NoContent)
        }
        None => Err(ApiError::not_found(ApiOperation::Delete, CONTACT_NOT_FOUND)
            .with_entity(ENTITY, raw_id)),
    }
}
