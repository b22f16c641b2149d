//! Query descriptors for listing contacts and the paginated result shape
//!
//! ```rust
//! use contacts_service::repository::{ContactsPage, Pagination};
//!
//! let pagination = Pagination::new(3, 10);
//! assert_eq!(pagination.offset(), 20);
//!
//! let page: ContactsPage = ContactsPage::new(Vec::new(), 2, 10, 25);
//! assert_eq!(page.total_pages, 3);
//! assert!(page.has_next_page);
//! assert!(page.has_previous_page);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::models::{Contact, ContactType};
use crate::ids::UserId;

/// Which page of results to return (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Page number, never below 1
    pub page: u32,
    /// Page size, never below 1
    pub per_page: u32,
}

impl Pagination {
    /// Build pagination; zeroes are raised to 1
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: if page == 0 { 1 } else { page },
            per_page: if per_page == 0 { 1 } else { per_page },
        }
    }

    /// Number of matching contacts to skip
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Contact field a list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "_id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "phoneNumber")]
    PhoneNumber,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "isFavourite")]
    IsFavourite,
    #[serde(rename = "contactType")]
    ContactType,
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
}

impl SortField {
    /// Every sortable field
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::Name,
        Self::PhoneNumber,
        Self::Email,
        Self::IsFavourite,
        Self::ContactType,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    /// JSON name of the field
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Name => "name",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::IsFavourite => "isFavourite",
            Self::ContactType => "contactType",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }

    /// Look a field up by its JSON name
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }

    /// Compare two contacts on this field alone
    #[must_use]
    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::PhoneNumber => a.phone_number.cmp(&b.phone_number),
            Self::Email => a.email.cmp(&b.email),
            Self::IsFavourite => a.is_favourite.cmp(&b.is_favourite),
            Self::ContactType => a.contact_type.as_str().cmp(b.contact_type.as_str()),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Ordering of a contact list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Sort {
    /// Total order over contacts: the sort field first, then `_id`
    #[must_use]
    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        let primary = self.sort_by.compare(a, b).then_with(|| a.id.cmp(&b.id));
        match self.sort_order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        }
    }
}

/// Optional equality predicates over contact fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactFilter {
    pub contact_type: Option<ContactType>,
    pub is_favourite: Option<bool>,
}

impl ContactFilter {
    /// Whether a contact satisfies every set predicate
    #[must_use]
    pub fn matches(&self, contact: &Contact) -> bool {
        self.contact_type
            .map_or(true, |contact_type| contact.contact_type == contact_type)
            && self
                .is_favourite
                .map_or(true, |is_favourite| contact.is_favourite == is_favourite)
    }
}

/// Everything a list request asks the store for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactQuery {
    pub user_id: UserId,
    pub pagination: Pagination,
    pub sort: Sort,
    pub filter: ContactFilter,
}

impl ContactQuery {
    /// Query for the first page of a user's contacts with default ordering
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            pagination: Pagination::default(),
            sort: Sort::default(),
            filter: ContactFilter::default(),
        }
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: ContactFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// One page of contacts plus pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsPage<T = Contact> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> ContactsPage<T> {
    /// Build a page, deriving `total_pages` and the navigation flags
    #[must_use]
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total_items: u64) -> Self {
        let per_page = if per_page == 0 { 1 } else { per_page };
        let total_pages = calculate_total_pages(total_items, per_page);
        Self {
            data,
            page,
            per_page,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// Ceiling division, clamped to `u32`
fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page);
    let pages = total.div_ceil(per_page);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::ids::ContactId;

    fn contact(name: &str, favourite: bool, contact_type: ContactType) -> Contact {
        let now = Utc::now();
        Contact {
            id: ContactId::new(),
            name: name.to_string(),
            phone_number: "1".to_string(),
            email: None,
            is_favourite: favourite,
            contact_type,
            user_id: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pagination_raises_zeroes() {
        assert_eq!(Pagination::new(0, 0), Pagination::new(1, 1));
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(4, 25).offset(), 75);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(calculate_total_pages(0, 10), 0);
        assert_eq!(calculate_total_pages(1, 10), 1);
        assert_eq!(calculate_total_pages(10, 10), 1);
        assert_eq!(calculate_total_pages(11, 10), 2);
    }

    #[test]
    fn test_empty_page() {
        let page: ContactsPage = ContactsPage::new(Vec::new(), 1, 10, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_previous_page);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalItems"], 0);
        assert_eq!(json["perPage"], 10);
        assert_eq!(json["hasNextPage"], false);
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page: ContactsPage<u8> = ContactsPage::new(vec![1], 3, 10, 21);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next_page);
        assert!(page.has_previous_page);
    }

    #[test]
    fn test_sort_field_keys() {
        for field in SortField::ALL {
            assert_eq!(SortField::from_key(field.as_str()), Some(field));
        }
        assert_eq!(SortField::from_key("userId"), None);
        assert_eq!(SortField::default(), SortField::Id);
    }

    #[test]
    fn test_sort_compare_breaks_ties_by_id() {
        let a = contact("Same", false, ContactType::Home);
        let b = contact("Same", false, ContactType::Home);
        let sort = Sort {
            sort_by: SortField::Name,
            sort_order: SortOrder::Asc,
        };
        assert_eq!(sort.compare(&a, &b), a.id.cmp(&b.id));

        let desc = Sort {
            sort_order: SortOrder::Desc,
            ..sort
        };
        assert_eq!(desc.compare(&a, &b), b.id.cmp(&a.id));
    }

    #[test]
    fn test_sort_by_created_at() {
        let mut older = contact("Z", false, ContactType::Work);
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = contact("A", false, ContactType::Work);
        let sort = Sort {
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Asc,
        };
        assert_eq!(sort.compare(&older, &newer), Ordering::Less);
    }

    #[test]
    fn test_filter_matches() {
        let starred_work = contact("A", true, ContactType::Work);
        assert!(ContactFilter::default().matches(&starred_work));
        assert!(ContactFilter {
            contact_type: Some(ContactType::Work),
            is_favourite: Some(true),
        }
        .matches(&starred_work));
        assert!(!ContactFilter {
            contact_type: Some(ContactType::Home),
            is_favourite: None,
        }
        .matches(&starred_work));
        assert!(!ContactFilter {
            contact_type: None,
            is_favourite: Some(false),
        }
        .matches(&starred_work));
    }
}
