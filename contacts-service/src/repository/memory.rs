//! In-process contact store
//!
//! Holds every contact in a `BTreeMap` keyed by id behind a tokio `RwLock`.
//! The lock is only held for the duration of a single repository call.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryOperation};
use super::models::{Contact, ContactPatch, ContactType, NewContact, UpsertOptions, UpsertOutcome};
use super::query::{ContactQuery, ContactsPage};
use super::traits::{ContactRepository, RepositoryResult};
use crate::ids::{ContactId, UserId};

const ENTITY: &str = "Contact";

/// Contact store backed by process memory
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<BTreeMap<ContactId, Contact>>>,
}

impl InMemoryContactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contacts across all users
    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contacts.read().await.is_empty()
    }
}

fn required_text(
    operation: RepositoryOperation,
    field: &str,
    value: Option<String>,
) -> RepositoryResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RepositoryError::validation_failed(
            operation,
            format!("{field} is required"),
        )),
    }
}

fn present_text(
    operation: RepositoryOperation,
    field: &str,
    value: Option<String>,
) -> RepositoryResult<Option<String>> {
    value
        .map(|text| required_text(operation, field, Some(text)))
        .transpose()
}

fn contact_type(
    operation: RepositoryOperation,
    value: Option<&str>,
) -> RepositoryResult<Option<ContactType>> {
    value
        .map(|raw| {
            raw.parse::<ContactType>()
                .map_err(|err| RepositoryError::validation_failed(operation, err.to_string()))
        })
        .transpose()
}

/// Build a contact from fields that all still need checking
fn build_contact(
    operation: RepositoryOperation,
    id: ContactId,
    user_id: UserId,
    fields: ContactPatch,
) -> RepositoryResult<Contact> {
    let contact_type = contact_type(operation, fields.contact_type.as_deref())?.unwrap_or_default();
    let name = required_text(operation, "name", fields.name)?;
    let phone_number = required_text(operation, "phoneNumber", fields.phone_number)?;
    let now = Utc::now();

    Ok(Contact {
        id,
        name,
        phone_number,
        email: fields.email,
        is_favourite: fields.is_favourite.unwrap_or(false),
        contact_type,
        user_id,
        created_at: now,
        updated_at: now,
    })
}

/// Validate the whole patch, then apply it
fn apply_patch(contact: &mut Contact, patch: ContactPatch) -> RepositoryResult<()> {
    let operation = RepositoryOperation::Upsert;
    let contact_type = contact_type(operation, patch.contact_type.as_deref())?;
    let name = present_text(operation, "name", patch.name)?;
    let phone_number = present_text(operation, "phoneNumber", patch.phone_number)?;

    if let Some(name) = name {
        contact.name = name;
    }
    if let Some(phone_number) = phone_number {
        contact.phone_number = phone_number;
    }
    if let Some(email) = patch.email {
        contact.email = Some(email);
    }
    if let Some(is_favourite) = patch.is_favourite {
        contact.is_favourite = is_favourite;
    }
    if let Some(contact_type) = contact_type {
        contact.contact_type = contact_type;
    }
    contact.updated_at = Utc::now();
    Ok(())
}

#[async_trait]
impl ContactRepository for InMemoryContactStore {
    async fn create_contact(&self, contact: NewContact) -> RepositoryResult<Contact> {
        let operation = RepositoryOperation::Create;
        let user_id = contact.user_id.ok_or_else(|| {
            RepositoryError::validation_failed(operation, "userId is required")
        })?;
        let fields = ContactPatch {
            name: contact.name,
            phone_number: contact.phone_number,
            email: contact.email,
            is_favourite: contact.is_favourite,
            contact_type: contact.contact_type,
        };
        let record = build_contact(operation, ContactId::new(), user_id, fields)?;

        let mut contacts = self.contacts.write().await;
        if contacts.contains_key(&record.id) {
            return Err(RepositoryError::already_exists(ENTITY, record.id.to_string()));
        }
        contacts.insert(record.id, record.clone());
        tracing::debug!(contact_id = %record.id, user_id = %user_id, "contact inserted");
        Ok(record)
    }

    async fn get_all_contacts(&self, query: ContactQuery) -> RepositoryResult<ContactsPage> {
        let contacts = self.contacts.read().await;
        let mut matching: Vec<&Contact> = contacts
            .values()
            .filter(|contact| contact.user_id == query.user_id && query.filter.matches(contact))
            .collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));

        let total_items = matching.len() as u64;
        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let per_page = query.pagination.per_page as usize;
        let data = matching
            .into_iter()
            .skip(offset)
            .take(per_page)
            .cloned()
            .collect();

        Ok(ContactsPage::new(
            data,
            query.pagination.page,
            query.pagination.per_page,
            total_items,
        ))
    }

    async fn get_contact_by_id(
        &self,
        id: &ContactId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Contact>> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .get(id)
            .filter(|contact| contact.user_id == *user_id)
            .cloned())
    }

    async fn upsert_contact(
        &self,
        id: &ContactId,
        user_id: &UserId,
        patch: ContactPatch,
        options: UpsertOptions,
    ) -> RepositoryResult<Option<UpsertOutcome>> {
        let mut contacts = self.contacts.write().await;
        match contacts.get_mut(id) {
            Some(existing) if existing.user_id == *user_id => {
                apply_patch(existing, patch).map_err(|err| err.with_entity(ENTITY, id.to_string()))?;
                Ok(Some(UpsertOutcome {
                    contact: existing.clone(),
                    is_new: false,
                }))
            }
            Some(_) => Ok(None),
            None if options.upsert => {
                let record = build_contact(RepositoryOperation::Upsert, *id, *user_id, patch)
                    .map_err(|err| err.with_entity(ENTITY, id.to_string()))?;
                contacts.insert(record.id, record.clone());
                tracing::debug!(contact_id = %id, user_id = %user_id, "contact inserted by upsert");
                Ok(Some(UpsertOutcome {
                    contact: record,
                    is_new: true,
                }))
            }
            None => Ok(None),
        }
    }

    async fn delete_contact(
        &self,
        id: &ContactId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Contact>> {
        let mut contacts = self.contacts.write().await;
        let owned = contacts
            .get(id)
            .is_some_and(|contact| contact.user_id == *user_id);
        Ok(if owned { contacts.remove(id) } else { None })
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        ContactFilter, Pagination, RepositoryErrorKind, Sort, SortField, SortOrder,
    };

    fn new_contact(name: &str, phone: &str) -> NewContact {
        NewContact {
            name: Some(name.to_string()),
            phone_number: Some(phone.to_string()),
            ..NewContact::default()
        }
    }

    async fn seed(store: &InMemoryContactStore, user: UserId, names: &[&str]) -> Vec<Contact> {
        let mut created = Vec::new();
        for name in names {
            created.push(
                store
                    .create_contact(new_contact(name, "555").owned_by(user))
                    .await
                    .unwrap(),
            );
        }
        created
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();

        let contact = store
            .create_contact(new_contact("Ada", "555").owned_by(user))
            .await
            .unwrap();

        assert_eq!(contact.user_id, user);
        assert_eq!(contact.contact_type, ContactType::Personal);
        assert!(!contact.is_favourite);
        assert_eq!(contact.created_at, contact.updated_at);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();

        let missing_owner = store.create_contact(new_contact("Ada", "555")).await;
        assert_eq!(
            missing_owner.unwrap_err().kind,
            RepositoryErrorKind::ValidationFailed
        );

        let missing_phone = NewContact {
            name: Some("Ada".to_string()),
            ..NewContact::default()
        }
        .owned_by(user);
        let err = store.create_contact(missing_phone).await.unwrap_err();
        assert_eq!(err.message, "phoneNumber is required");

        let blank_name = new_contact("  ", "555").owned_by(user);
        let err = store.create_contact(blank_name).await.unwrap_err();
        assert_eq!(err.message, "name is required");

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_contact_type() {
        let store = InMemoryContactStore::new();
        let payload = NewContact {
            contact_type: Some("friend".to_string()),
            ..new_contact("Ada", "555")
        }
        .owned_by(UserId::new());

        let err = store.create_contact(payload).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);
        assert!(err.message.contains("friend"));
    }

    #[tokio::test]
    async fn test_reads_are_scoped_to_owner() {
        let store = InMemoryContactStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let contact = seed(&store, alice, &["Ada"]).await.remove(0);

        assert!(store.get_contact_by_id(&contact.id, &alice).await.unwrap().is_some());
        assert!(store.get_contact_by_id(&contact.id, &bob).await.unwrap().is_none());

        let bobs = store.get_all_contacts(ContactQuery::for_user(bob)).await.unwrap();
        assert_eq!(bobs.total_items, 0);
    }

    #[tokio::test]
    async fn test_list_paginates_sorts_and_filters() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();
        seed(&store, user, &["Cleo", "Ada", "Bea", "Dora", "Eve"]).await;
        seed(&store, UserId::new(), &["Other"]).await;

        let query = ContactQuery::for_user(user)
            .with_pagination(Pagination::new(2, 2))
            .with_sort(Sort {
                sort_by: SortField::Name,
                sort_order: SortOrder::Asc,
            });
        let page = store.get_all_contacts(query).await.unwrap();
        let names: Vec<&str> = page.data.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Cleo", "Dora"]);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(page.has_previous_page);

        let desc = query.with_pagination(Pagination::new(1, 10)).with_sort(Sort {
            sort_by: SortField::Name,
            sort_order: SortOrder::Desc,
        });
        let page = store.get_all_contacts(desc).await.unwrap();
        assert_eq!(page.data[0].name, "Eve");

        let past_end = query.with_pagination(Pagination::new(9, 2));
        let page = store.get_all_contacts(past_end).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_items, 5);
    }

    #[tokio::test]
    async fn test_list_filters_by_favourite() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();
        store
            .create_contact(
                NewContact {
                    is_favourite: Some(true),
                    contact_type: Some("work".to_string()),
                    ..new_contact("Star", "1")
                }
                .owned_by(user),
            )
            .await
            .unwrap();
        seed(&store, user, &["Plain"]).await;

        let query = ContactQuery::for_user(user).with_filter(ContactFilter {
            contact_type: None,
            is_favourite: Some(true),
        });
        let page = store.get_all_contacts(query).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.data[0].name, "Star");
    }

    #[tokio::test]
    async fn test_update_only_patch() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();
        let contact = seed(&store, user, &["Old"]).await.remove(0);

        let patch = ContactPatch {
            name: Some("New".to_string()),
            ..ContactPatch::default()
        };
        let outcome = store
            .upsert_contact(&contact.id, &user, patch.clone(), UpsertOptions::UPDATE_ONLY)
            .await
            .unwrap()
            .unwrap();
        assert!(!outcome.is_new);
        assert_eq!(outcome.contact.name, "New");
        assert_eq!(outcome.contact.phone_number, contact.phone_number);
        assert_eq!(outcome.contact.created_at, contact.created_at);

        let missing = store
            .upsert_contact(&ContactId::new(), &user, patch, UpsertOptions::UPDATE_ONLY)
            .await
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_patch_leaves_contact_untouched() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();
        let contact = seed(&store, user, &["Old"]).await.remove(0);

        let patch = ContactPatch {
            name: Some("New".to_string()),
            contact_type: Some("friend".to_string()),
            ..ContactPatch::default()
        };
        let err = store
            .upsert_contact(&contact.id, &user, patch, UpsertOptions::UPDATE_ONLY)
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);
        assert_eq!(err.entity_id, Some(contact.id.to_string()));

        let stored = store.get_contact_by_id(&contact.id, &user).await.unwrap().unwrap();
        assert_eq!(stored.name, "Old");
    }

    #[tokio::test]
    async fn test_upsert_inserts_missing_id() {
        let store = InMemoryContactStore::new();
        let user = UserId::new();
        let id = ContactId::new();
        let patch = ContactPatch {
            name: Some("Ada".to_string()),
            phone_number: Some("555".to_string()),
            ..ContactPatch::default()
        };

        let outcome = store
            .upsert_contact(&id, &user, patch.clone(), UpsertOptions::CREATE_OR_UPDATE)
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.is_new);
        assert_eq!(outcome.contact.id, id);
        assert_eq!(outcome.contact.user_id, user);

        let again = store
            .upsert_contact(&id, &user, patch, UpsertOptions::CREATE_OR_UPDATE)
            .await
            .unwrap()
            .unwrap();
        assert!(!again.is_new);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_never_takes_over_foreign_contact() {
        let store = InMemoryContactStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let contact = seed(&store, alice, &["Ada"]).await.remove(0);

        let patch = ContactPatch {
            name: Some("Hijacked".to_string()),
            phone_number: Some("0".to_string()),
            ..ContactPatch::default()
        };
        let outcome = store
            .upsert_contact(&contact.id, &bob, patch, UpsertOptions::CREATE_OR_UPDATE)
            .await
            .unwrap();
        assert!(outcome.is_none());

        let stored = store.get_contact_by_id(&contact.id, &alice).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
    }

    #[tokio::test]
    async fn test_delete_is_scoped_and_single_shot() {
        let store = InMemoryContactStore::new();
        let alice = UserId::new();
        let contact = seed(&store, alice, &["Ada"]).await.remove(0);

        assert!(store.delete_contact(&contact.id, &UserId::new()).await.unwrap().is_none());
        assert_eq!(store.len().await, 1);

        let removed = store.delete_contact(&contact.id, &alice).await.unwrap();
        assert_eq!(removed.map(|c| c.id), Some(contact.id));
        assert!(store.delete_contact(&contact.id, &alice).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = InMemoryContactStore::new();
        let clone = store.clone();
        seed(&store, UserId::new(), &["Ada"]).await;
        assert_eq!(clone.len().await, 1);
        assert!(clone.ping().await.is_ok());
    }
}
