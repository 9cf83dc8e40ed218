//! Common test utilities and fixtures.
//!
//! This module provides a versioned record type, store constructors and
//! raw engine helpers shared by the integration tests.

#![allow(dead_code)]

use tablekv::engine::Engine;
use tablekv::kv::{Database, Datastore, Digest, DynDigest, Object, ObjectError, ObjectVersion};
use tempfile::TempDir;

// =============================================================================
// Record Types
// =============================================================================

/// A document whose version identity is its title, body and parent.
///
/// `views` is bookkeeping and deliberately left out of the digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub body: String,
    pub views: u64,
    pub previous: Option<Digest>,
}

impl Note {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            ..Self::default()
        }
    }

    /// Next version of this note with a new body, linked to `parent`.
    pub fn revise(&self, body: &str, parent: &Digest) -> Self {
        Self {
            title: self.title.clone(),
            body: body.to_string(),
            views: self.views,
            previous: Some(parent.clone()),
        }
    }
}

impl Object for Note {
    fn marshal(&self) -> Result<Vec<u8>, ObjectError> {
        let mut out = Vec::new();
        put_field(&mut out, self.title.as_bytes());
        put_field(&mut out, self.body.as_bytes());
        out.extend_from_slice(&self.views.to_le_bytes());
        put_field(
            &mut out,
            self.previous.as_ref().map(Digest::as_bytes).unwrap_or_default(),
        );
        Ok(out)
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), ObjectError> {
        let mut rest = bytes;
        self.title = take_string(&mut rest)?;
        self.body = take_string(&mut rest)?;
        let (views, tail) = rest
            .split_first_chunk::<8>()
            .ok_or_else(|| ObjectError::decode("truncated views"))?;
        self.views = u64::from_le_bytes(*views);
        rest = tail;
        let previous = take_field(&mut rest)?;
        self.previous = (!previous.is_empty()).then(|| Digest::from_bytes(previous));
        if !rest.is_empty() {
            return Err(ObjectError::decode("trailing bytes"));
        }
        Ok(())
    }
}

impl ObjectVersion for Note {
    fn hash_content(&self, state: &mut dyn DynDigest) {
        for field in [
            self.title.as_bytes(),
            self.body.as_bytes(),
            self.previous.as_ref().map(Digest::as_bytes).unwrap_or_default(),
        ] {
            state.update(&(field.len() as u64).to_le_bytes());
            state.update(field);
        }
    }

    fn previous_digest(&self) -> Option<&Digest> {
        self.previous.as_ref()
    }
}

fn put_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u32).to_le_bytes());
    out.extend_from_slice(field);
}

fn take_field(rest: &mut &[u8]) -> Result<Vec<u8>, ObjectError> {
    let (len, tail) = rest
        .split_first_chunk::<4>()
        .ok_or_else(|| ObjectError::decode("truncated length"))?;
    let len = u32::from_le_bytes(*len) as usize;
    let (field, tail) = tail
        .split_at_checked(len)
        .ok_or_else(|| ObjectError::decode("truncated field"))?;
    *rest = tail;
    Ok(field.to_vec())
}

fn take_string(rest: &mut &[u8]) -> Result<String, ObjectError> {
    String::from_utf8(take_field(rest)?).map_err(|e| ObjectError::decode(e.to_string()))
}

// =============================================================================
// Stores
// =============================================================================

/// Database `app` in a fresh in-memory store.
pub fn memory_db() -> anyhow::Result<Database> {
    Ok(Datastore::open("mem://")?.db("app")?)
}

/// A fjall-backed store in a temporary directory.
pub struct TempStore {
    pub store: Datastore,
    pub dir: TempDir,
}

impl TempStore {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let store = Datastore::open(&Self::url_for(&dir))?;
        Ok(Self { store, dir })
    }

    pub fn url_for(dir: &TempDir) -> String {
        format!("fjall://{}", dir.path().display())
    }
}

// =============================================================================
// Raw Engine Access
// =============================================================================

/// Every physical key under `prefix`, in engine order.
pub fn raw_keys(engine: &dyn Engine, prefix: &[u8]) -> anyhow::Result<Vec<Vec<u8>>> {
    let txn = engine.begin_read()?;
    let mut keys = Vec::new();
    for entry in txn.prefix(prefix) {
        keys.push(entry?.0);
    }
    Ok(keys)
}

/// Write `value` at `key`, bypassing every table.
pub fn raw_set(engine: &dyn Engine, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
    let mut txn = engine.begin_write()?;
    txn.set(key, value)?;
    txn.commit()?;
    Ok(())
}
