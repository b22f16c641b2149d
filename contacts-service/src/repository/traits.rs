//! The contact storage seam
//!
//! Handlers only ever talk to a `dyn ContactRepository`, so any backend that
//! honours the ownership rules below can be plugged into
//! [`AppState`](crate::state::AppState).

use async_trait::async_trait;

use super::error::RepositoryError;
use super::models::{Contact, ContactPatch, NewContact, UpsertOptions, UpsertOutcome};
use super::query::{ContactQuery, ContactsPage};
use crate::ids::{ContactId, UserId};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Owner-scoped contact storage
///
/// Every read and write except `create_contact` takes the requesting user,
/// and a contact owned by anyone else behaves exactly like a missing one:
/// `Ok(None)`, never an error.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a contact owned by `contact.user_id`
    ///
    /// Fails with `ValidationFailed` when the owner, `name` or `phoneNumber`
    /// is missing, or when `contactType` is not a known value.
    async fn create_contact(&self, contact: NewContact) -> RepositoryResult<Contact>;

    /// One page of the query's user's contacts, filtered and sorted
    async fn get_all_contacts(&self, query: ContactQuery) -> RepositoryResult<ContactsPage>;

    async fn get_contact_by_id(
        &self,
        id: &ContactId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Contact>>;

    /// Apply `patch` to the user's contact
    ///
    /// With `options.upsert` a missing id is inserted for `user_id` (the patch
    /// must then carry every required field). An id owned by another user is
    /// never overwritten and yields `Ok(None)`.
    async fn upsert_contact(
        &self,
        id: &ContactId,
        user_id: &UserId,
        patch: ContactPatch,
        options: UpsertOptions,
    ) -> RepositoryResult<Option<UpsertOutcome>>;

    /// Remove the user's contact, returning what was removed
    async fn delete_contact(
        &self,
        id: &ContactId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Contact>>;

    /// Cheap reachability check used by the readiness probe
    async fn ping(&self) -> RepositoryResult<()>;
}
