//! Contracts for values stored in tables, and content digests.
//!
//! A table never knows the concrete type it stores; it only needs to turn
//! values into bytes and back, and to make a fresh instance to decode into.
//! [`Object`] covers that, with [`Default`] acting as the factory. A
//! versioned table additionally needs [`ObjectVersion`]: the value writes
//! the fields that define its version identity into a streaming hash, and
//! the table keys the stored body by the resulting [`Digest`].

use std::fmt;
use std::sync::Arc;

use sha2::digest::DynDigest;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use super::error::KvError;

/// Failures while encoding or decoding a stored value.
#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("failed to encode object: {0}")]
    Encode(String),

    #[error("failed to decode object: {0}")]
    Decode(String),
}

impl ObjectError {
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// A value that can be stored in a [`Table`](super::Table).
///
/// `unmarshal` must accept anything `marshal` produced. Tables call
/// `Self::default()` to obtain the instance they decode into.
pub trait Object: Default {
    fn marshal(&self) -> Result<Vec<u8>, ObjectError>;

    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), ObjectError>;
}

/// A value that can be stored in a [`VersionedTable`](super::VersionedTable).
pub trait ObjectVersion: Object {
    /// Feed the fields that make up version identity into `state`.
    ///
    /// Two values that write the same bytes here are the same version.
    /// Fields left out (counters, timestamps, caches) do not affect the
    /// digest.
    fn hash_content(&self, state: &mut dyn DynDigest);

    /// Digest of the version this one was derived from, `None` for the
    /// first version. Tables never follow this link; it is there for
    /// callers walking history with
    /// [`get_version`](super::VersionedTable::get_version).
    fn previous_digest(&self) -> Option<&Digest>;
}

/// Constructor for a fresh streaming hash state.
///
/// Called once per hashed write.
pub type HashFn = Arc<dyn Fn() -> Box<dyn DynDigest> + Send + Sync>;

/// SHA-256, the default digest algorithm.
pub fn sha256() -> HashFn {
    Arc::new(|| -> Box<dyn DynDigest> { Box::new(Sha256::new()) })
}

/// Digest of `obj` under `hasher`.
pub fn compute_digest<T: ObjectVersion>(obj: &T, hasher: &HashFn) -> Digest {
    let mut state = hasher();
    obj.hash_content(&mut *state);
    Digest(state.finalize().into_vec())
}

/// Output of a digest algorithm over an object's version-relevant content.
///
/// Displayed as lowercase hex; stored as raw bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest(Vec<u8>);

impl Digest {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(hex).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// An opaque byte blob. Its whole content is its version identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawObject(pub Vec<u8>);

impl RawObject {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Object for RawObject {
    fn marshal(&self) -> Result<Vec<u8>, ObjectError> {
        Ok(self.0.clone())
    }

    fn unmarshal(&mut self, bytes: &[u8]) -> Result<(), ObjectError> {
        self.0 = bytes.to_vec();
        Ok(())
    }
}

impl ObjectVersion for RawObject {
    fn hash_content(&self, state: &mut dyn DynDigest) {
        state.update(&self.0);
    }

    fn previous_digest(&self) -> Option<&Digest> {
        None
    }
}

/// Decode `bytes` into a fresh `T`.
pub(crate) fn decode<T: Object>(bytes: &[u8]) -> Result<T, KvError> {
    let mut obj = T::default();
    obj.unmarshal(bytes)?;
    Ok(obj)
}
