//! Identifiers used by the contacts service
//!
//! Two families of identifiers live here:
//!
//! - **Object identifiers**: 12-byte values rendered as 24 lowercase hex
//!   characters. Contacts and their owning users are keyed by these, and any
//!   string that is not exactly 24 hex characters is rejected before it can
//!   reach storage.
//! - **Request identifiers**: TypeID strings (`req_<base32 uuidv7>`) attached to
//!   every inbound request for log correlation.
//!
//! ```rust
//! use contacts_service::ids::{ContactId, ObjectId};
//!
//! let id = ContactId::new();
//! assert_eq!(id.to_string().len(), 24);
//! assert!(ObjectId::is_valid(&id.to_string()));
//! assert!(ContactId::parse("abc").is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use http::Request;
use mti::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};
use uuid::Uuid;

/// Number of raw bytes in an object identifier
pub const OBJECT_ID_BYTES: usize = 12;

/// Length of the hex rendering of an object identifier
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_BYTES * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

fn process_unique() -> &'static [u8; 5] {
    PROCESS_UNIQUE.get_or_init(|| {
        let random = Uuid::new_v4().into_bytes();
        let mut out = [0u8; 5];
        out.copy_from_slice(&random[..5]);
        out
    })
}

fn next_count() -> u32 {
    let counter = COUNTER.get_or_init(|| {
        let random = Uuid::new_v4().into_bytes();
        AtomicU32::new(u32::from_be_bytes([0, 0, random[0], random[1]]))
    });
    counter.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK
}

/// Error returned when a string is not a valid object identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectIdError {
    /// Wrong number of characters
    #[error("object id must be {OBJECT_ID_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),

    /// Right length, but not hexadecimal
    #[error("object id contains non-hexadecimal characters")]
    InvalidHex,
}

/// A 12-byte document identifier
///
/// Layout: 4-byte big-endian seconds since the Unix epoch, 5 bytes unique to
/// the process, 3-byte big-endian counter. Identifiers generated by one
/// process therefore sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

impl ObjectId {
    /// Generate a fresh identifier
    #[must_use]
    pub fn new() -> Self {
        let seconds = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let count = next_count().to_be_bytes();

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&count[1..]);
        Self(bytes)
    }

    /// Build an identifier from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Parse the 24-character hex form (either case)
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != OBJECT_ID_HEX_LEN {
            return Err(ObjectIdError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; OBJECT_ID_BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ObjectIdError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// Check whether `s` has the 24-hex-character object id format
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        s.len() == OBJECT_ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Raw bytes
    #[must_use]
    pub const fn bytes(&self) -> [u8; OBJECT_ID_BYTES] {
        self.0
    }

    /// Lowercase hex rendering
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Seconds since the epoch encoded in the first four bytes
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}

macro_rules! object_id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ObjectId);

        impl $name {
            /// Generate a fresh identifier
            #[must_use]
            pub fn new() -> Self {
                Self(ObjectId::new())
            }

            /// Parse the 24-character hex form
            pub fn parse(s: &str) -> Result<Self, ObjectIdError> {
                ObjectId::parse_str(s).map(Self)
            }

            /// The underlying object identifier
            #[must_use]
            pub const fn as_object_id(&self) -> &ObjectId {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ObjectIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<ObjectId> for $name {
            fn from(id: ObjectId) -> Self {
                Self(id)
            }
        }
    };
}

object_id_newtype! {
    /// Identifier of a stored contact
    ContactId
}

object_id_newtype! {
    /// Identifier of the account that owns contacts
    UserId
}

/// A type-safe request identifier for distributed tracing.
///
/// Format: `req_<base32-encoded-uuidv7>`, e.g. `req_01h455vb4pex5vsknk084sn02q`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(MagicTypeId);

impl RequestId {
    /// The prefix used for request IDs
    pub const PREFIX: &'static str = "req";

    /// Creates a new time-sortable request ID
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = RequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mti = MagicTypeId::from_str(s).map_err(RequestIdError::Parse)?;
        if mti.prefix().as_str() != Self::PREFIX {
            return Err(RequestIdError::InvalidPrefix {
                expected: Self::PREFIX.to_string(),
                actual: mti.prefix().as_str().to_string(),
            });
        }
        Ok(Self(mti))
    }
}

/// Error type for request ID parsing.
#[derive(Debug, thiserror::Error)]
pub enum RequestIdError {
    /// The ID could not be parsed as a valid TypeID.
    #[error("failed to parse request ID: {0}")]
    Parse(#[from] MagicTypeIdError),

    /// The prefix was not the expected value.
    #[error("invalid prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        /// The expected prefix.
        expected: String,
        /// The actual prefix found.
        actual: String,
    },
}

/// Generates [`RequestId`]s for `tower_http::request_id::SetRequestIdLayer`
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = RequestId::new();
        let header_value = http::HeaderValue::from_str(id.as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_hex_roundtrip() {
        let id = ObjectId::new();
        let hex = id.to_string();
        assert_eq!(hex.len(), OBJECT_ID_HEX_LEN);
        assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        assert_eq!(ObjectId::parse_str(&hex).unwrap(), id);
    }

    #[test]
    fn test_object_id_parse_is_case_insensitive() {
        let lower = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let upper = ObjectId::parse_str("65A1F0C2E4B0A1B2C3D4E5F6").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_object_id_rejects_wrong_length() {
        assert_eq!(ObjectId::parse_str("abc"), Err(ObjectIdError::InvalidLength(3)));
        assert_eq!(ObjectId::parse_str(""), Err(ObjectIdError::InvalidLength(0)));
        assert!(ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6a").is_err());
    }

    #[test]
    fn test_object_id_rejects_non_hex() {
        assert_eq!(
            ObjectId::parse_str("zza1f0c2e4b0a1b2c3d4e5f6"),
            Err(ObjectIdError::InvalidHex)
        );
    }

    #[test]
    fn test_is_valid_matches_parse() {
        for candidate in [
            "65a1f0c2e4b0a1b2c3d4e5f6",
            "abc",
            "65a1f0c2e4b0a1b2c3d4e5fg",
            "65a1f0c2-4b0a1b2c3d4e5f6",
            "ééééééééééééé",
        ] {
            assert_eq!(
                ObjectId::is_valid(candidate),
                ObjectId::parse_str(candidate).is_ok(),
                "{candidate}"
            );
        }
    }

    #[test]
    fn test_generated_ids_are_unique_and_ordered() {
        let ids: Vec<ObjectId> = (0..100).map(|_| ObjectId::new()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_timestamp_is_recent() {
        let id = ObjectId::new();
        let now = chrono::Utc::now().timestamp();
        assert!((now - i64::from(id.timestamp())).abs() <= 2);
    }

    #[test]
    fn test_typed_ids_serialize_as_hex_strings() {
        let id = ContactId::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65a1f0c2e4b0a1b2c3d4e5f6\"");

        let back: ContactId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_typed_id_deserialize_rejects_invalid() {
        let result: Result<UserId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_request_id_new() {
        let id = RequestId::new();
        assert!(id.as_str().starts_with("req_"));
        assert_eq!(id.as_str().len(), 30);
    }

    #[test]
    fn test_request_id_invalid_prefix() {
        let result = RequestId::from_str("user_01h455vb4pex5vsknk084sn02q");
        match result.unwrap_err() {
            RequestIdError::InvalidPrefix { expected, actual } => {
                assert_eq!(expected, "req");
                assert_eq!(actual, "user");
            }
            other => panic!("Expected InvalidPrefix error, got {other:?}"),
        }
    }

    #[test]
    fn test_make_typed_request_id() {
        let mut maker = MakeTypedRequestId;
        let request = http::Request::builder().body(()).unwrap();

        let header_value = maker.make_request_id(&request).unwrap().into_header_value();
        assert!(header_value.to_str().unwrap().starts_with("req_"));
    }
}
