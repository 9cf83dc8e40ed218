//! Unversioned tables: one body per id, no history.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::engine::Engine;
use crate::logging::{debug, warn};

use super::error::KvError;
use super::keys;
use super::object::{Object, decode};

/// A collection of `T` values keyed by caller-chosen ids.
///
/// Each record lives at `table prefix + id`. Ids starting with `ref/` or
/// `object/` are rejected with `InvalidArgument`, since a versioned table
/// of the same name keeps its records there. Every operation runs in one
/// engine transaction, so the existence check and the write it guards
/// cannot be separated by another writer.
pub struct Table<T> {
    engine: Arc<dyn Engine>,
    prefix: Vec<u8>,
    _object: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            prefix: self.prefix.clone(),
            _object: PhantomData,
        }
    }
}

impl<T: Object> Table<T> {
    pub(crate) fn new(engine: Arc<dyn Engine>, prefix: String) -> Self {
        Self {
            engine,
            prefix: prefix.into_bytes(),
            _object: PhantomData,
        }
    }

    /// Key prefix shared by every record of this table.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Insert `obj` under `id`, failing with `AlreadyExists` if the id is
    /// taken.
    pub fn create(&self, id: &[u8], obj: &T) -> Result<(), KvError> {
        let key = self.key(id)?;
        debug!(key = %key.escape_ascii(), "creating record");
        let value = obj.marshal()?;

        let mut txn = self.engine.begin_write()?;
        if txn.get(&key)?.is_some() {
            warn!(key = %key.escape_ascii(), "record already exists");
            return Err(KvError::already_exists(&key));
        }
        txn.set(&key, &value)?;
        txn.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &[u8]) -> Result<T, KvError> {
        let key = self.key(id)?;
        debug!(key = %key.escape_ascii(), "reading record");

        let txn = self.engine.begin_read()?;
        let value = txn.get(&key)?.ok_or_else(|| KvError::not_found(&key))?;
        decode(&value)
    }

    /// Replace the value under `id`, failing with `NotFound` if there is
    /// none.
    pub fn update(&self, id: &[u8], obj: &T) -> Result<(), KvError> {
        let key = self.key(id)?;
        debug!(key = %key.escape_ascii(), "updating record");
        let value = obj.marshal()?;

        let mut txn = self.engine.begin_write()?;
        if txn.get(&key)?.is_none() {
            return Err(KvError::not_found(&key));
        }
        txn.set(&key, &value)?;
        txn.commit()?;
        Ok(())
    }

    pub fn delete(&self, id: &[u8]) -> Result<(), KvError> {
        let key = self.key(id)?;
        debug!(key = %key.escape_ascii(), "deleting record");

        let mut txn = self.engine.begin_write()?;
        if txn.get(&key)?.is_none() {
            return Err(KvError::not_found(&key));
        }
        txn.delete(&key)?;
        txn.commit()?;
        Ok(())
    }

    /// Visit, in key order, every record whose id starts with `start`.
    ///
    /// An empty `start` visits the whole table. The scan sees the table as
    /// of the moment it began. The first error returned by `visit` stops
    /// the scan and is returned unchanged.
    pub fn iter<F, E>(&self, start: &[u8], mut visit: F) -> Result<(), E>
    where
        F: FnMut(T) -> Result<(), E>,
        E: From<KvError>,
    {
        let prefix = self.key(start)?;
        debug!(prefix = %prefix.escape_ascii(), "iterating records");

        let txn = self.engine.begin_read().map_err(KvError::from)?;
        for entry in txn.prefix(&prefix) {
            let (key, value) = entry.map_err(KvError::from)?;
            // References and bodies of a same-named versioned table.
            if keys::is_reserved_id(keys::id_after(&self.prefix, &key)) {
                continue;
            }
            visit(decode(&value)?)?;
        }
        Ok(())
    }

    fn key(&self, id: &[u8]) -> Result<Vec<u8>, KvError> {
        keys::validate_record_id(id)?;
        Ok(keys::record_key(&self.prefix, id))
    }
}
