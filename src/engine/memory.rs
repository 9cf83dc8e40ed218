//! In-process engine backed by a `BTreeMap`.
//!
//! Readers clone an `Arc` of the current map and keep that snapshot for the
//! lifetime of their transaction. Writers hold the writer mutex from
//! `begin_write` until commit or drop, stage their changes in an overlay,
//! and publish a new map on commit. A snapshot still held by a reader keeps
//! the old map alive, so readers never block writers.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::{Engine, EngineError, KvIter, ReadTxn, WriteTxn};
use crate::logging::trace;

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile engine selected by the `mem://` scheme.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: RwLock<Arc<Map>>,
    writer: Mutex<()>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Arc<Map>, EngineError> {
        self.state
            .read()
            .map(|state| Arc::clone(&state))
            .map_err(|_| EngineError::poisoned("memory engine state"))
    }
}

impl Engine for MemoryEngine {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>, EngineError> {
        Ok(Box::new(MemoryReadTxn {
            snapshot: self.snapshot()?,
        }))
    }

    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>, EngineError> {
        let guard = self
            .writer
            .lock()
            .map_err(|_| EngineError::poisoned("memory engine writer"))?;
        // Taken under the writer lock, so no commit can land before ours.
        let base = self.snapshot()?;
        Ok(Box::new(MemoryWriteTxn {
            engine: self,
            _guard: guard,
            base,
            pending: BTreeMap::new(),
        }))
    }
}

struct MemoryReadTxn {
    snapshot: Arc<Map>,
}

impl ReadTxn for MemoryReadTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        Ok(self.snapshot.get(key).cloned())
    }

    fn prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        let prefix = prefix.to_vec();
        Box::new(
            self.snapshot
                .range(prefix.clone()..)
                .take_while(move |(key, _)| key.starts_with(&prefix))
                .map(|(key, value)| Ok((key.clone(), value.clone()))),
        )
    }
}

struct MemoryWriteTxn<'a> {
    engine: &'a MemoryEngine,
    _guard: MutexGuard<'a, ()>,
    base: Arc<Map>,
    /// `None` marks a pending delete.
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteTxn for MemoryWriteTxn<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        match self.pending.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.base.get(key).cloned()),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), EngineError> {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), EngineError> {
        self.pending.insert(key.to_vec(), None);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), EngineError> {
        let MemoryWriteTxn {
            engine,
            _guard,
            base,
            pending,
        } = *self;
        if pending.is_empty() {
            return Ok(());
        }
        trace!(writes = pending.len(), "committing memory transaction");

        // Release our own reference first so make_mut can avoid a copy when
        // no reader holds the same snapshot.
        drop(base);
        let mut state = engine
            .state
            .write()
            .map_err(|_| EngineError::poisoned("memory engine state"))?;
        let map = Arc::make_mut(&mut *state);
        for (key, value) in pending {
            match value {
                Some(value) => {
                    map.insert(key, value);
                }
                None => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}
