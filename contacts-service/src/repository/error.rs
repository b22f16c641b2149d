//! Storage error types
//!
//! Every contact store reports failures as a [`RepositoryError`]: what it was
//! doing, what category of failure occurred, and which contact was involved.
//! A missing contact is *not* an error at this layer; lookups return `None`.
//!
//! ```rust
//! use contacts_service::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::validation_failed(RepositoryOperation::Create, "name is required");
//! assert_eq!(error.kind, RepositoryErrorKind::ValidationFailed);
//! assert!(!error.is_retriable());
//! ```

use std::fmt;

/// Storage operation that was running when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Inserting a new contact
    Create,
    /// Listing a user's contacts
    FindAll,
    /// Loading one contact
    FindById,
    /// Updating, or creating when allowed, one contact
    Upsert,
    /// Removing one contact
    Delete,
    /// Readiness probe
    Ping,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::FindAll => write!(f, "find_all"),
            Self::FindById => write!(f, "find_by_id"),
            Self::Upsert => write!(f, "upsert"),
            Self::Delete => write!(f, "delete"),
            Self::Ping => write!(f, "ping"),
        }
    }
}

/// Category of storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Entity already exists (duplicate key)
    AlreadyExists,
    /// Store-level constraint violation
    ConstraintViolation,
    /// Document failed validation before being written
    ValidationFailed,
    /// Could not reach the store
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Underlying store error
    DatabaseError,
    /// Document could not be encoded or decoded
    SerializationError,
    /// Anything else
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::ConstraintViolation => "constraint_violation",
            Self::ValidationFailed => "validation_failed",
            Self::ConnectionFailed => "connection_failed",
            Self::Timeout => "timeout",
            Self::DatabaseError => "database_error",
            Self::SerializationError => "serialization_error",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Structured storage error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved, normally `"Contact"`
    pub entity_type: Option<String>,
    /// The identifier of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create an error without entity context
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// A document was rejected before being written
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// A document with the same key is already stored
    pub fn already_exists(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Create,
            RepositoryErrorKind::AlreadyExists,
            "Entity already exists",
        )
        .with_entity(entity_type, entity_id)
    }

    /// The store could not be reached
    pub fn connection_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ConnectionFailed, message)
    }

    /// The store reported an error of its own
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Transient failures that may succeed on a later attempt
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{entity_type}: {entity_id}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(RepositoryOperation::Create.to_string(), "create");
        assert_eq!(RepositoryOperation::FindAll.to_string(), "find_all");
        assert_eq!(RepositoryOperation::FindById.to_string(), "find_by_id");
        assert_eq!(RepositoryOperation::Upsert.to_string(), "upsert");
        assert_eq!(RepositoryOperation::Delete.to_string(), "delete");
        assert_eq!(RepositoryOperation::Ping.to_string(), "ping");
    }

    #[test]
    fn test_already_exists_carries_entity() {
        let error = RepositoryError::already_exists("Contact", "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(error.kind, RepositoryErrorKind::AlreadyExists);
        assert_eq!(error.entity_type.as_deref(), Some("Contact"));
        assert_eq!(error.entity_id.as_deref(), Some("65a1f0c2e4b0a1b2c3d4e5f6"));
    }

    #[test]
    fn test_display_with_and_without_entity() {
        let bare = RepositoryError::database_error(RepositoryOperation::FindAll, "cursor lost");
        assert_eq!(
            bare.to_string(),
            "Repository database_error error during find_all: cursor lost"
        );

        let with_entity = RepositoryError::validation_failed(
            RepositoryOperation::Upsert,
            "contactType must be one of work, home, personal",
        )
        .with_entity("Contact", "abc");
        assert!(with_entity.to_string().ends_with("[Contact: abc]"));
    }

    #[test]
    fn test_retriable_kinds() {
        assert!(RepositoryError::connection_failed(RepositoryOperation::Ping, "refused").is_retriable());
        assert!(RepositoryError::new(
            RepositoryOperation::FindById,
            RepositoryErrorKind::Timeout,
            "slow"
        )
        .is_retriable());
        assert!(!RepositoryError::validation_failed(RepositoryOperation::Create, "x").is_retriable());
        assert!(!RepositoryError::database_error(RepositoryOperation::Delete, "x").is_retriable());
    }
}
