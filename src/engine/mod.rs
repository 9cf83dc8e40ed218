//! The ordered key-value engine underneath every table.
//!
//! Tables only ever talk to an [`Engine`] through transactions: a
//! [`ReadTxn`] for point reads and prefix scans, a [`WriteTxn`] for
//! check-then-write mutations. A write transaction that is dropped without
//! [`WriteTxn::commit`] leaves the store untouched, so an early `?` return
//! inside a table operation is always a rollback.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryEngine`]: in-process `BTreeMap`, selected by `mem://`.
//! - [`FjallEngine`]: persistent LSM storage, selected by `fjall://<dir>`
//!   (requires the `fjall` feature).

#[cfg(feature = "fjall")]
mod fjall;
mod memory;

use thiserror::Error;

#[cfg(feature = "fjall")]
pub use self::fjall::FjallEngine;
pub use self::memory::MemoryEngine;

/// One `(key, value)` pair yielded by a prefix scan.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Lexicographically ordered scan over the keys sharing a prefix.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<KvPair, EngineError>> + 'a>;

/// Failures raised by a storage backend.
///
/// Absence of a key is never an error at this level; reads return `None`
/// instead, which is what lets tables tell "not found" apart from I/O or
/// corruption problems.
#[derive(Error, Debug)]
pub enum EngineError {
    #[cfg(feature = "fjall")]
    #[error("Fjall error: {0}")]
    Fjall(#[from] ::fjall::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the engine's writer lock.
    #[error("Engine lock poisoned: {0}")]
    Poisoned(String),
}

impl EngineError {
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::Poisoned(what.to_string())
    }
}

/// A transactional ordered byte-key/byte-value store.
///
/// Implementations must serialize write transactions with respect to each
/// other: two concurrent `begin_write` callers never interleave their
/// reads and commits. Read transactions must never observe half of a
/// committed write transaction.
pub trait Engine: Send + Sync {
    /// Begin a read-only transaction over a consistent view of the store.
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>, EngineError>;

    /// Begin a read-write transaction. Blocks while another write
    /// transaction on the same engine is open.
    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>, EngineError>;
}

/// Read side of a transaction.
pub trait ReadTxn {
    /// Point lookup. `Ok(None)` means the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError>;

    /// Every pair whose key starts with `prefix`, in ascending key order.
    fn prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a>;
}

/// Read-write transaction.
///
/// Reads observe the transaction's own pending writes.
pub trait WriteTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError>;

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), EngineError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), EngineError>;

    /// Apply every pending write atomically.
    fn commit(self: Box<Self>) -> Result<(), EngineError>;
}
