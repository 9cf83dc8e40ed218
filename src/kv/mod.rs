//! Tables over a transactional ordered key-value engine.
//!
//! A [`Datastore`] hands out [`Database`]s, which hand out [`Table`]s and
//! [`VersionedTable`]s. Each handle owns an immutable key prefix; all
//! reads and writes happen in the tables, one engine transaction per
//! operation.

mod error;
pub mod keys;
mod object;
mod store;
mod table;
mod versioned;

pub use error::{ErrorKind, KvError};
pub use object::{
    Digest, HashFn, Object, ObjectError, ObjectVersion, RawObject, compute_digest, sha256,
};
pub use store::{Database, Datastore, FJALL_SCHEME, MEMORY_SCHEME};
pub use table::Table;
pub use versioned::VersionedTable;

/// Streaming hash state that [`ObjectVersion::hash_content`] writes into.
pub use sha2::digest::DynDigest;
