//! Error types for table operations.

use thiserror::Error;

use crate::engine::EngineError;

use super::object::{Digest, ObjectError};

/// Errors that can occur during datastore, database and table operations.
#[derive(Error, Debug)]
pub enum KvError {
    /// A create targeted an id that already has a live record or reference.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A read, update or delete targeted an id with no live record or
    /// reference.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Backend not supported: '{0}'")]
    BackendUnsupported(String),

    /// A live reference names an object body that is not in the store.
    #[error("Corrupt reference {reference}: object {digest} is missing")]
    Corrupt { reference: String, digest: Digest },

    #[error("Object encoding error: {0}")]
    Object(#[from] ObjectError),

    #[error("Transaction failed: {0}")]
    Transaction(#[from] EngineError),
}

/// The closed set of failure categories a caller can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    InvalidArgument,
    BackendUnsupported,
    Corrupt,
    Encoding,
    TransactionFailure,
}

impl KvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::BackendUnsupported(_) => ErrorKind::BackendUnsupported,
            Self::Corrupt { .. } => ErrorKind::Corrupt,
            Self::Object(_) => ErrorKind::Encoding,
            Self::Transaction(_) => ErrorKind::TransactionFailure,
        }
    }

    /// Returns `true` if the id (or database/table entry) does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns `true` if a create collided with a live record.
    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }

    pub(crate) fn not_found(key: &[u8]) -> Self {
        Self::NotFound(key.escape_ascii().to_string())
    }

    pub(crate) fn already_exists(key: &[u8]) -> Self {
        Self::AlreadyExists(key.escape_ascii().to_string())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert!(KvError::not_found(b"/db/t/ref/x").is_not_found());
        assert!(KvError::already_exists(b"/db/t/ref/x").is_already_exists());
        assert_eq!(
            KvError::BackendUnsupported("s3".into()).kind(),
            ErrorKind::BackendUnsupported
        );
        assert_eq!(
            KvError::from(ObjectError::decode("short buffer")).kind(),
            ErrorKind::Encoding
        );
        assert_eq!(
            KvError::from(EngineError::poisoned("writer")).kind(),
            ErrorKind::TransactionFailure
        );
    }

    #[test]
    fn test_messages_escape_binary_keys() {
        let err = KvError::not_found(b"/db/t/\x00\xff");
        assert_eq!(err.to_string(), "Not found: /db/t/\\x00\\xff");

        let err = KvError::BackendUnsupported("badger".into());
        assert_eq!(err.to_string(), "Backend not supported: 'badger'");
    }
}
