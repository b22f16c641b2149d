//! Contact persistence
//!
//! - [`ContactRepository`]: the owner-scoped storage trait handlers depend on
//! - [`InMemoryContactStore`]: the bundled implementation
//! - [`ContactQuery`] / [`ContactsPage`]: list query descriptor and result
//! - [`RepositoryError`]: structured storage failures
//!
//! ```rust
//! use contacts_service::ids::UserId;
//! use contacts_service::repository::{ContactQuery, ContactRepository, InMemoryContactStore, NewContact};
//!
//! # async fn demo() -> Result<(), contacts_service::repository::RepositoryError> {
//! let store = InMemoryContactStore::new();
//! let owner = UserId::new();
//!
//! let payload = NewContact {
//!     name: Some("Ada".into()),
//!     phone_number: Some("+380501234567".into()),
//!     ..NewContact::default()
//! };
//! let created = store.create_contact(payload.owned_by(owner)).await?;
//!
//! let page = store.get_all_contacts(ContactQuery::for_user(owner)).await?;
//! assert_eq!(page.data, vec![created]);
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod models;
mod query;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::InMemoryContactStore;
pub use models::{
    Contact, ContactPatch, ContactType, NewContact, UnknownContactType, UpsertOptions,
    UpsertOutcome,
};
pub use query::{ContactFilter, ContactQuery, ContactsPage, Pagination, Sort, SortField, SortOrder};
pub use traits::{ContactRepository, RepositoryResult};
