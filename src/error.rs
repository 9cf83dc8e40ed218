//! Unified error type for the tablekv library.
//!
//! Module errors convert into [`Error`] with `?`, so applications can use a
//! single error type across opening, configuration and table operations.

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::kv::{ErrorKind, KvError};

/// Unified error type for all tablekv operations.
///
/// # Example
///
/// ```ignore
/// use tablekv::{Datastore, RawObject, Result};
///
/// fn seed() -> Result<()> {
///     let store = Datastore::open("mem://")?;
///     let users = store.db("app")?.table::<RawObject>("users")?;
///     users.create(b"alice", &RawObject::new("admin"))?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Error from a datastore, database or table operation.
    #[error(transparent)]
    Kv(#[from] KvError),

    /// Error from loading configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Self::Kv(KvError::Transaction(err))
    }
}

impl Error {
    /// The table-level failure category, if this is a table error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Kv(err) => Some(err.kind()),
            Self::Config(_) | Self::Io(_) => None,
        }
    }

    /// Returns `true` if this is a KV error.
    pub fn is_kv(&self) -> bool {
        matches!(self, Self::Kv(_))
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
