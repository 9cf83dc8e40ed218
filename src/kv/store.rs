//! Datastore and database handles.
//!
//! Neither handle touches the engine. Each one only narrows the key prefix
//! it hands down: a [`Datastore`] owns `/`, a [`Database`] owns `/<db>/`,
//! and the tables it opens own `/<db>/<table>/`. Names are not recorded
//! anywhere in the store; callers address databases and tables by the
//! names they already know.

use std::fmt;
use std::sync::Arc;

use crate::config::StoreConfig;
#[cfg(feature = "fjall")]
use crate::engine::FjallEngine;
use crate::engine::{Engine, MemoryEngine};
use crate::logging::{debug, info, warn};

use super::error::KvError;
use super::keys;
use super::object::{HashFn, Object, ObjectVersion};
use super::table::Table;
use super::versioned::VersionedTable;

/// Scheme of the in-process engine.
pub const MEMORY_SCHEME: &str = "mem";

/// Scheme of the persistent fjall engine.
pub const FJALL_SCHEME: &str = "fjall";

/// Top-level handle over one physical store.
///
/// Cloning is cheap; clones share the engine.
///
/// # Example
///
/// ```ignore
/// use tablekv::prelude::*;
///
/// let store = Datastore::open("fjall:///var/lib/app")?;
/// let db = store.db("app")?;
/// let notes = db.versioned_table::<Note>("notes", sha256())?;
/// let digest = notes.create(b"welcome", &note)?;
/// let (current, current_digest) = notes.get(b"welcome")?;
/// ```
#[derive(Clone)]
pub struct Datastore {
    engine: Arc<dyn Engine>,
}

impl Datastore {
    /// Open the store selected by `url` (`fjall://<dir>` or `mem://`).
    pub fn open(url: &str) -> Result<Self, KvError> {
        Self::open_with_config(&StoreConfig::with_url(url))
    }

    /// Open the store selected by `config.url`.
    pub fn open_with_config(config: &StoreConfig) -> Result<Self, KvError> {
        let (scheme, path) = split_url(&config.url);
        debug!(url = %config.url, "opening datastore");

        let engine: Arc<dyn Engine> = match scheme {
            MEMORY_SCHEME => Arc::new(MemoryEngine::new()),
            #[cfg(feature = "fjall")]
            FJALL_SCHEME => {
                if path.is_empty() {
                    return Err(KvError::invalid_argument(format!(
                        "url '{}' has no directory",
                        config.url
                    )));
                }
                Arc::new(FjallEngine::open_with(path, config.sync_writes)?)
            }
            other => {
                warn!(scheme = other, "backend not supported");
                return Err(KvError::BackendUnsupported(other.to_string()));
            }
        };

        info!(url = %config.url, "datastore opened");
        Ok(Self::from_engine(engine))
    }

    /// Wrap an engine that is already open.
    pub fn from_engine(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Handle for the database `name`.
    pub fn db(&self, name: &str) -> Result<Database, KvError> {
        Ok(Database {
            engine: Arc::clone(&self.engine),
            prefix: keys::child_prefix(keys::ROOT_PREFIX, name)?,
        })
    }

    /// Handle for the database `name`.
    ///
    /// Databases need no on-disk setup, so this is currently the same as
    /// [`db`](Self::db).
    pub fn create_db(&self, name: &str) -> Result<Database, KvError> {
        self.db(name)
    }
}

impl fmt::Debug for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datastore").finish_non_exhaustive()
    }
}

/// A named group of tables.
#[derive(Clone)]
pub struct Database {
    engine: Arc<dyn Engine>,
    prefix: String,
}

impl Database {
    /// Key prefix shared by every table of this database.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Unversioned table `name` holding `T` values.
    pub fn table<T: Object>(&self, name: &str) -> Result<Table<T>, KvError> {
        let prefix = keys::child_prefix(&self.prefix, name)?;
        Ok(Table::new(Arc::clone(&self.engine), prefix))
    }

    /// Unversioned table `name` holding `T` values.
    ///
    /// Tables need no on-disk setup, so this is currently the same as
    /// [`table`](Self::table).
    pub fn create_table<T: Object>(&self, name: &str) -> Result<Table<T>, KvError> {
        self.table(name)
    }

    /// Versioned table `name` holding `T` values, hashed with `hasher`.
    ///
    /// Every handle on the same table must use the same algorithm, since
    /// the digest is part of every body key.
    pub fn versioned_table<T: ObjectVersion>(
        &self,
        name: &str,
        hasher: HashFn,
    ) -> Result<VersionedTable<T>, KvError> {
        let prefix = keys::child_prefix(&self.prefix, name)?;
        Ok(VersionedTable::new(Arc::clone(&self.engine), prefix, hasher))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Split `scheme://path`. A URL without `://` has an empty scheme.
fn split_url(url: &str) -> (&str, &str) {
    url.split_once("://").unwrap_or(("", url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url() {
        assert_eq!(split_url("fjall:///var/db"), ("fjall", "/var/db"));
        assert_eq!(split_url("fjall://data"), ("fjall", "data"));
        assert_eq!(split_url("mem://"), ("mem", ""));
        assert_eq!(split_url("/var/db"), ("", "/var/db"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = Datastore::open("badger:///tmp/db");
        assert!(matches!(err, Err(KvError::BackendUnsupported(ref s)) if s == "badger"));

        let err = Datastore::open("no-scheme");
        assert!(matches!(err, Err(KvError::BackendUnsupported(ref s)) if s.is_empty()));
    }

    #[test]
    fn test_prefixes() -> Result<(), KvError> {
        let store = Datastore::open("mem://")?;
        let db = store.create_db("app")?;
        assert_eq!(db.prefix(), "/app/");

        let table = db.table::<crate::kv::RawObject>("users")?;
        assert_eq!(table.prefix(), b"/app/users/");
        Ok(())
    }

    #[test]
    fn test_rejects_nested_names() -> Result<(), KvError> {
        let store = Datastore::open("mem://")?;
        assert!(store.db("").is_err());
        assert!(store.db("a/b").is_err());

        let db = store.db("app")?;
        assert!(db.table::<crate::kv::RawObject>("/").is_err());
        assert!(db.versioned_table::<crate::kv::RawObject>("a/b", crate::kv::sha256()).is_err());
        Ok(())
    }
}
