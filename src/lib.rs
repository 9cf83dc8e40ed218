//! Namespaced tables over a transactional ordered key-value engine.
//!
//! tablekv stores caller-defined records in tables, grouped into databases,
//! inside one physical store. Every table is a key prefix; nothing but key
//! layout separates them.
//!
//! Two table flavors exist:
//!
//! - [`Table`]: one body per id, overwritten in place.
//! - [`VersionedTable`]: every version is kept under a key derived from a
//!   digest of its content, and a per-id reference points at the current
//!   one. Create, update and delete move the reference and write bodies in
//!   a single engine transaction.
//!
//! # Quick Start
//!
//! ```ignore
//! use tablekv::prelude::*;
//!
//! let store = Datastore::open("fjall://.tablekv")?;
//! let db = store.db("app")?;
//!
//! let settings = db.table::<RawObject>("settings")?;
//! settings.create(b"theme", &RawObject::new("dark"))?;
//!
//! let docs = db.versioned_table::<RawObject>("docs", sha256())?;
//! let v1 = docs.create(b"readme", &RawObject::new("hello"))?;
//! let v2 = docs.update(b"readme", &RawObject::new("hello, world"))?;
//! let old = docs.get_version(b"readme", &v1)?;
//! ```
//!
//! # Modules
//!
//! - [`kv`] - Datastore, databases, tables and the key layout
//! - [`engine`] - Engine traits and the bundled backends
//! - [`config`] - TOML configuration
//! - [`error`] - Unified error type
//! - [`prelude`] - Convenient re-exports
//!
//! # Feature Flags
//!
//! - `fjall` - Persistent fjall engine and the `fjall://` scheme (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `full` - Enable all features

pub mod config;
pub mod engine;
pub mod error;
pub mod kv;
#[macro_use]
pub(crate) mod logging;
pub mod prelude;

// Re-export the unified error type
pub use error::{Error, Result};

// Re-export the main types at crate root for convenience
pub use config::StoreConfig;
pub use kv::{
    Database, Datastore, Digest, ErrorKind, KvError, Object, ObjectError, ObjectVersion,
    RawObject, Table, VersionedTable, sha256,
};
