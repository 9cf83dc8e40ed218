//! Persistent engine backed by fjall.
//!
//! All tables of a datastore share one fjall keyspace; isolation between
//! them comes purely from key prefixes. The database is opened as a fjall
//! single-writer transactional database: a read transaction is a fjall
//! [`Snapshot`], and a write transaction is a fjall write transaction that
//! holds the database's writer lock until it commits or is dropped. A
//! reference and the object body it points to therefore become visible
//! together or not at all, and an open reader never sees a later commit.

use std::path::Path;

use ::fjall::{
    KeyspaceCreateOptions, PersistMode, Readable, SingleWriterTxDatabase, SingleWriterTxKeyspace,
    SingleWriterWriteTx, Snapshot,
};

use super::{Engine, EngineError, KvIter, ReadTxn, WriteTxn};
use crate::logging::{debug, info, trace};

/// Name of the fjall keyspace holding every table's records.
const KEYSPACE: &str = "tables";

/// Engine selected by the `fjall://<dir>` scheme.
pub struct FjallEngine {
    db: SingleWriterTxDatabase,
    keyspace: SingleWriterTxKeyspace,
    sync_writes: bool,
}

impl FjallEngine {
    /// Open (or create) a store in `path` with synchronous commits.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::open_with(path, true)
    }

    /// Open (or create) a store in `path`.
    ///
    /// With `sync_writes` every commit fsyncs the journal before the write
    /// transaction returns; otherwise commits are buffered.
    pub fn open_with(path: impl AsRef<Path>, sync_writes: bool) -> Result<Self, EngineError> {
        let path = path.as_ref();
        debug!(path = %path.display(), sync_writes = sync_writes, "opening fjall engine");

        let db = SingleWriterTxDatabase::builder(path).open()?;
        let keyspace = db.keyspace(KEYSPACE, KeyspaceCreateOptions::default)?;

        info!(path = %path.display(), "fjall engine opened");
        Ok(Self {
            db,
            keyspace,
            sync_writes,
        })
    }

    /// Flush and fsync everything committed so far.
    pub fn persist(&self) -> Result<(), EngineError> {
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl Engine for FjallEngine {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>, EngineError> {
        Ok(Box::new(FjallReadTxn {
            snapshot: self.db.read_tx(),
            keyspace: &self.keyspace,
        }))
    }

    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>, EngineError> {
        let mut tx = self.db.write_tx();
        if self.sync_writes {
            tx = tx.durability(Some(PersistMode::SyncAll));
        }
        Ok(Box::new(FjallWriteTxn {
            tx,
            keyspace: &self.keyspace,
        }))
    }
}

struct FjallReadTxn<'a> {
    snapshot: Snapshot,
    keyspace: &'a SingleWriterTxKeyspace,
}

impl ReadTxn for FjallReadTxn<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(self
            .snapshot
            .get(self.keyspace, key)?
            .map(|value| value.to_vec()))
    }

    fn prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        trace!(prefix = %prefix.escape_ascii(), "fjall prefix scan");
        Box::new(self.snapshot.prefix(self.keyspace, prefix).map(|guard| {
            let (key, value) = guard.into_inner()?;
            Ok((key.to_vec(), value.to_vec()))
        }))
    }
}

struct FjallWriteTxn<'a> {
    tx: SingleWriterWriteTx<'a>,
    keyspace: &'a SingleWriterTxKeyspace,
}

impl WriteTxn for FjallWriteTxn<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(self.tx.get(self.keyspace, key)?.map(|value| value.to_vec()))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), EngineError> {
        self.tx.insert(self.keyspace, key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), EngineError> {
        self.tx.remove(self.keyspace, key);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), EngineError> {
        trace!("committing fjall transaction");
        self.tx.commit()?;
        Ok(())
    }
}
