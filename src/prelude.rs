//! Convenient re-exports for common usage patterns.
//!
//! ```ignore
//! use tablekv::prelude::*;
//!
//! let store = Datastore::open("mem://")?;
//! let refs = store.db("app")?.versioned_table::<RawObject>("refs", sha256())?;
//! let digest = refs.create(b"main", &RawObject::new("v1"))?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Configuration
pub use crate::config::{LogFormat, LoggingConfig, StoreConfig};

// Engines
#[cfg(feature = "fjall")]
pub use crate::engine::FjallEngine;
pub use crate::engine::{Engine, EngineError, MemoryEngine};

// Tables
pub use crate::kv::{
    Database, Datastore, Digest, DynDigest, ErrorKind, HashFn, KvError, Object, ObjectError,
    ObjectVersion, RawObject, Table, VersionedTable, sha256,
};
