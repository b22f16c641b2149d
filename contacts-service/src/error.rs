//! Service-level errors
//!
//! These cover startup and serving: loading configuration, binding the
//! listener, running the server. Request handling reports failures through
//! [`ApiError`](crate::handlers::ApiError) instead.

use thiserror::Error;

/// Result type alias using the service [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while starting or running the service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or extracted
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error, e.g. while binding the listener
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loaded but holds unusable values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal service error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: port taken");
    }

    #[test]
    fn test_figment_error_is_boxed() {
        let err: Error = figment::Error::from("missing field `port`".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = Error::InvalidConfig("service.port must not be 0".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: service.port must not be 0");
    }
}
