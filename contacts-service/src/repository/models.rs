//! Contact documents and the payloads used to write them

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ContactId, UserId};

/// Category a contact is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    /// Work contact
    Work,
    /// Home contact
    Home,
    /// Personal contact
    #[default]
    Personal,
}

impl ContactType {
    /// All accepted values, in their wire form
    pub const VALUES: [&'static str; 3] = ["work", "home", "personal"];

    /// Wire form of this value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Home => "home",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a `contactType` outside [`ContactType::VALUES`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("contactType must be one of work, home or personal, got '{0}'")]
pub struct UnknownContactType(pub String);

impl FromStr for ContactType {
    type Err = UnknownContactType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Self::Work),
            "home" => Ok(Self::Home),
            "personal" => Ok(Self::Personal),
            other => Err(UnknownContactType(other.to_string())),
        }
    }
}

/// A stored contact
///
/// Every contact belongs to exactly one user. Stores never return a contact
/// to anyone but its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Document identifier
    #[serde(rename = "_id")]
    pub id: ContactId,
    /// Display name
    pub name: String,
    /// Phone number, stored as submitted
    pub phone_number: String,
    /// Optional email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the owner starred this contact
    pub is_favourite: bool,
    /// Category
    pub contact_type: ContactType,
    /// Owning user
    pub user_id: UserId,
    /// Set once on insert
    pub created_at: DateTime<Utc>,
    /// Refreshed on every write
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request
///
/// Fields are optional here; required-field checks belong to the store. A
/// `userId` in the request body is ignored: the owner is always assigned from
/// the authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_favourite: Option<bool>,
    /// Raw value, checked against [`ContactType`] by the store
    #[serde(default)]
    pub contact_type: Option<String>,
    #[serde(default, skip_deserializing)]
    pub user_id: Option<UserId>,
}

impl NewContact {
    /// Set the owning user, replacing whatever was there
    #[must_use]
    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Partial update of a contact
///
/// Absent fields are left unchanged. The identifier and the owner cannot be
/// changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_favourite: Option<bool>,
    #[serde(default)]
    pub contact_type: Option<String>,
}

impl ContactPatch {
    /// True when the patch would not change anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.is_favourite.is_none()
            && self.contact_type.is_none()
    }
}

/// Options for [`ContactRepository::upsert_contact`](super::ContactRepository::upsert_contact)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpsertOptions {
    /// Insert a new contact when no contact has the given id
    pub upsert: bool,
}

impl UpsertOptions {
    /// Update only
    pub const UPDATE_ONLY: Self = Self { upsert: false };
    /// Update, or insert when missing
    pub const CREATE_OR_UPDATE: Self = Self { upsert: true };
}

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// The contact after the write
    pub contact: Contact,
    /// True when the write inserted a new contact
    pub is_new: bool,
}
