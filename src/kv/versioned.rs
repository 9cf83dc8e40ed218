//! Versioned tables: content-addressed history plus a movable reference.
//!
//! Every write stores the object body under a key derived from its digest
//! (`object/<id>/<digest>`) and points the id's reference (`ref/<id>`) at
//! that digest. Bodies are append-only: a body key, once written, is never
//! rewritten or removed. Only the reference moves (update) or disappears
//! (delete), and it always moves in the same transaction that made its
//! target body present.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::engine::{Engine, ReadTxn, WriteTxn};
use crate::logging::{debug, error, trace, warn};

use super::error::KvError;
use super::keys;
use super::object::{Digest, HashFn, ObjectVersion, compute_digest, decode};

/// A collection of versioned `T` values keyed by caller-chosen ids.
pub struct VersionedTable<T> {
    engine: Arc<dyn Engine>,
    prefix: Vec<u8>,
    hasher: HashFn,
    _object: PhantomData<fn() -> T>,
}

impl<T> Clone for VersionedTable<T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            prefix: self.prefix.clone(),
            hasher: Arc::clone(&self.hasher),
            _object: PhantomData,
        }
    }
}

impl<T: ObjectVersion> VersionedTable<T> {
    pub(crate) fn new(engine: Arc<dyn Engine>, prefix: String, hasher: HashFn) -> Self {
        Self {
            engine,
            prefix: prefix.into_bytes(),
            hasher,
            _object: PhantomData,
        }
    }

    /// Key prefix shared by every reference and body of this table.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Digest `obj` would be stored under, using this table's algorithm.
    pub fn digest(&self, obj: &T) -> Digest {
        compute_digest(obj, &self.hasher)
    }

    /// Store the first version of `id`.
    ///
    /// Fails with `AlreadyExists` if `id` has a live reference. Returns the
    /// digest so the caller can pin the exact version just written.
    pub fn create(&self, id: &[u8], obj: &T) -> Result<Digest, KvError> {
        let digest = self.digest(obj);
        let value = obj.marshal()?;
        let ref_key = keys::reference_key(&self.prefix, id);
        debug!(key = %ref_key.escape_ascii(), digest = %digest, "creating version");

        let mut txn = self.engine.begin_write()?;
        if txn.get(&ref_key)?.is_some() {
            warn!(key = %ref_key.escape_ascii(), "reference already exists");
            return Err(KvError::already_exists(&ref_key));
        }
        self.put_body(&mut *txn, id, &digest, &value)?;
        txn.set(&ref_key, digest.as_bytes())?;
        txn.commit()?;
        Ok(digest)
    }

    /// Current version of `id` together with its digest.
    pub fn get(&self, id: &[u8]) -> Result<(T, Digest), KvError> {
        let ref_key = keys::reference_key(&self.prefix, id);
        debug!(key = %ref_key.escape_ascii(), "reading version");

        let txn = self.engine.begin_read()?;
        let digest = txn
            .get(&ref_key)?
            .map(Digest::from)
            .ok_or_else(|| KvError::not_found(&ref_key))?;
        let body = self.load_body(&*txn, id, &ref_key, &digest)?;
        Ok((decode(&body)?, digest))
    }

    /// Any stored version of `id` by digest, current or not.
    ///
    /// This reads the body directly and ignores the reference, so versions
    /// remain readable after the id is updated or deleted.
    pub fn get_version(&self, id: &[u8], digest: &Digest) -> Result<T, KvError> {
        let obj_key = keys::object_key(&self.prefix, id, digest.as_bytes());
        debug!(key = %obj_key.escape_ascii(), "reading stored version");

        let txn = self.engine.begin_read()?;
        let body = txn
            .get(&obj_key)?
            .ok_or_else(|| KvError::not_found(&obj_key))?;
        decode(&body)
    }

    /// Store a new version of `id` and make it current.
    ///
    /// Fails with `NotFound` if `id` has no live reference. The previous
    /// body stays in place, unreferenced.
    pub fn update(&self, id: &[u8], obj: &T) -> Result<Digest, KvError> {
        let value = obj.marshal()?;
        let digest = self.digest(obj);
        let ref_key = keys::reference_key(&self.prefix, id);
        debug!(key = %ref_key.escape_ascii(), digest = %digest, "updating version");

        let mut txn = self.engine.begin_write()?;
        if txn.get(&ref_key)?.is_none() {
            warn!(key = %ref_key.escape_ascii(), "no reference to update");
            return Err(KvError::not_found(&ref_key));
        }
        self.put_body(&mut *txn, id, &digest, &value)?;
        txn.set(&ref_key, digest.as_bytes())?;
        txn.commit()?;
        Ok(digest)
    }

    /// Remove the reference of `id`, returning the digest it pointed at.
    ///
    /// Bodies are left untouched.
    pub fn delete(&self, id: &[u8]) -> Result<Digest, KvError> {
        let ref_key = keys::reference_key(&self.prefix, id);
        debug!(key = %ref_key.escape_ascii(), "deleting reference");

        let mut txn = self.engine.begin_write()?;
        let digest = txn
            .get(&ref_key)?
            .map(Digest::from)
            .ok_or_else(|| KvError::not_found(&ref_key))?;
        txn.delete(&ref_key)?;
        txn.commit()?;
        Ok(digest)
    }

    /// Visit the current version of every id starting with `start`, in id
    /// order.
    ///
    /// Same snapshot and early-stop behavior as
    /// [`Table::iter`](super::Table::iter).
    pub fn iter<F, E>(&self, start: &[u8], mut visit: F) -> Result<(), E>
    where
        F: FnMut(T) -> Result<(), E>,
        E: From<KvError>,
    {
        let base = keys::reference_base(&self.prefix);
        let scan = keys::reference_key(&self.prefix, start);
        debug!(prefix = %scan.escape_ascii(), "iterating versions");

        let txn = self.engine.begin_read().map_err(KvError::from)?;
        for entry in txn.prefix(&scan) {
            let (ref_key, digest) = entry.map_err(KvError::from)?;
            let id = keys::id_after(&base, &ref_key);
            let digest = Digest::from(digest);
            trace!(key = %ref_key.escape_ascii(), digest = %digest, "dereferencing");
            let body = self.load_body(&*txn, id, &ref_key, &digest)?;
            visit(decode(&body)?)?;
        }
        Ok(())
    }

    /// Visit the current digest of every id starting with `start`, without
    /// reading any bodies.
    pub fn iter_ref<F, E>(&self, start: &[u8], mut visit: F) -> Result<(), E>
    where
        F: FnMut(Digest) -> Result<(), E>,
        E: From<KvError>,
    {
        let scan = keys::reference_key(&self.prefix, start);
        debug!(prefix = %scan.escape_ascii(), "iterating references");

        let txn = self.engine.begin_read().map_err(KvError::from)?;
        for entry in txn.prefix(&scan) {
            let (_, digest) = entry.map_err(KvError::from)?;
            visit(Digest::from(digest))?;
        }
        Ok(())
    }

    /// Write the body for `digest` unless it is already stored.
    ///
    /// Content-equal versions share a key, and bodies are append-only, so
    /// the first body written under a digest is the one that stays.
    fn put_body(
        &self,
        txn: &mut (dyn WriteTxn + '_),
        id: &[u8],
        digest: &Digest,
        value: &[u8],
    ) -> Result<(), KvError> {
        let obj_key = keys::object_key(&self.prefix, id, digest.as_bytes());
        if txn.get(&obj_key)?.is_some() {
            trace!(key = %obj_key.escape_ascii(), "body already stored");
            return Ok(());
        }
        txn.set(&obj_key, value)?;
        Ok(())
    }

    fn load_body(
        &self,
        txn: &(dyn ReadTxn + '_),
        id: &[u8],
        ref_key: &[u8],
        digest: &Digest,
    ) -> Result<Vec<u8>, KvError> {
        let obj_key = keys::object_key(&self.prefix, id, digest.as_bytes());
        txn.get(&obj_key)?.ok_or_else(|| {
            error!(
                key = %ref_key.escape_ascii(),
                digest = %digest,
                "reference points to a missing object"
            );
            KvError::Corrupt {
                reference: ref_key.escape_ascii().to_string(),
                digest: digest.clone(),
            }
        })
    }
}
