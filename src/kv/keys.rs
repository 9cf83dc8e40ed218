//! Physical key layout.
//!
//! Every handle owns a prefix built from `/`-terminated name segments:
//!
//! ```text
//! /                                   datastore
//! /<db>/                              database
//! /<db>/<table>/                      table
//! /<db>/<table>/<id>                  unversioned record
//! /<db>/<table>/ref/<id>              versioned reference -> digest
//! /<db>/<table>/object/<id>/<digest>  versioned object body
//! ```
//!
//! Names may not be empty and may not contain `/`, so no table prefix is a
//! prefix of another table's. A table and a versioned table opened under
//! the same name share a prefix, so unversioned record ids may not start
//! with `ref/` or `object/`. Versioned ids are arbitrary bytes: reference
//! keys stay unambiguous because `ref/` sits at a fixed offset, and object
//! keys because digests have a fixed length per table.

use super::error::KvError;

/// Prefix of the datastore itself.
pub const ROOT_PREFIX: &str = "/";

/// Segment introducing a versioned table's reference records.
pub const REF_SEGMENT: &[u8] = b"ref/";

/// Segment introducing a versioned table's object bodies.
pub const OBJECT_SEGMENT: &[u8] = b"object/";

const SEPARATOR: u8 = b'/';

/// Prefix of the child named `name` under `parent`, e.g. `/app/` + `users`
/// gives `/app/users/`.
pub fn child_prefix(parent: &str, name: &str) -> Result<String, KvError> {
    validate_name(name)?;
    Ok(format!("{parent}{name}/"))
}

/// Reject names that would make prefixes overlap.
pub fn validate_name(name: &str) -> Result<(), KvError> {
    if name.is_empty() {
        return Err(KvError::invalid_argument("name cannot be empty"));
    }
    if name.contains('/') {
        return Err(KvError::invalid_argument(format!(
            "name '{name}' cannot contain '/'"
        )));
    }
    Ok(())
}

/// Whether `id` starts with a segment reserved for versioned records.
pub fn is_reserved_id(id: &[u8]) -> bool {
    id.starts_with(REF_SEGMENT) || id.starts_with(OBJECT_SEGMENT)
}

/// Reject unversioned record ids that would alias versioned records.
pub fn validate_record_id(id: &[u8]) -> Result<(), KvError> {
    if is_reserved_id(id) {
        return Err(KvError::invalid_argument(format!(
            "record id '{}' starts with a reserved segment",
            id.escape_ascii()
        )));
    }
    Ok(())
}

/// `prefix + id`: the single key of an unversioned record.
pub fn record_key(prefix: &[u8], id: &[u8]) -> Vec<u8> {
    concat(&[prefix, id])
}

/// `prefix + "ref/"`: the start of a versioned table's reference family.
pub fn reference_base(prefix: &[u8]) -> Vec<u8> {
    concat(&[prefix, REF_SEGMENT])
}

/// `prefix + "ref/" + id`
pub fn reference_key(prefix: &[u8], id: &[u8]) -> Vec<u8> {
    concat(&[prefix, REF_SEGMENT, id])
}

/// `prefix + "object/" + id + "/" + digest`
pub fn object_key(prefix: &[u8], id: &[u8], digest: &[u8]) -> Vec<u8> {
    concat(&[prefix, OBJECT_SEGMENT, id, &[SEPARATOR], digest])
}

/// The id part of `key`, a key yielded by a prefix scan under `base`.
///
/// `base` is a table prefix for records and [`reference_base`] for
/// references. Scans only yield keys starting with the scanned prefix, so
/// the id is everything past `base`.
pub fn id_after<'k>(base: &[u8], key: &'k [u8]) -> &'k [u8] {
    key.get(base.len()..).unwrap_or_default()
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let mut key = Vec::with_capacity(parts.iter().map(|part| part.len()).sum());
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}
