//! Integration tests for unversioned tables.

mod common;

use common::{Note, TempStore, memory_db};
use tablekv::kv::{Datastore, ErrorKind, KvError, RawObject, sha256};

#[test]
fn test_crud_lifecycle() -> anyhow::Result<()> {
    let users = memory_db()?.table::<RawObject>("users")?;

    users.create(b"alice", &RawObject::new("admin"))?;
    assert_eq!(users.get(b"alice")?.as_bytes(), b"admin");

    users.update(b"alice", &RawObject::new("owner"))?;
    assert_eq!(users.get(b"alice")?.as_bytes(), b"owner");

    users.delete(b"alice")?;
    assert!(users.get(b"alice").is_err_and(|e| e.is_not_found()));
    Ok(())
}

#[test]
fn test_existence_checks() -> anyhow::Result<()> {
    let users = memory_db()?.table::<RawObject>("users")?;
    users.create(b"bob", &RawObject::new("1"))?;

    let err = users.create(b"bob", &RawObject::new("2"));
    assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::AlreadyExists));
    assert_eq!(users.get(b"bob")?.as_bytes(), b"1");

    let err = users.update(b"carol", &RawObject::new("3"));
    assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::NotFound));
    assert!(users.get(b"carol").is_err_and(|e| e.is_not_found()));

    let err = users.delete(b"carol");
    assert!(matches!(err, Err(KvError::NotFound(_))));
    Ok(())
}

#[test]
fn test_iter_by_id_prefix() -> anyhow::Result<()> {
    let notes = memory_db()?.table::<Note>("notes")?;
    for id in ["foo", "bar", "fox", "f"] {
        notes.create(id.as_bytes(), &Note::new(id, ""))?;
    }

    let mut titles = Vec::new();
    notes.iter(b"fo", |note| {
        titles.push(note.title);
        Ok::<_, KvError>(())
    })?;
    assert_eq!(titles, ["foo", "fox"]);

    let mut titles = Vec::new();
    notes.iter(b"", |note| {
        titles.push(note.title);
        Ok::<_, KvError>(())
    })?;
    assert_eq!(titles, ["bar", "f", "foo", "fox"]);
    Ok(())
}

#[test]
fn test_iter_stops_on_visitor_error() -> anyhow::Result<()> {
    let notes = memory_db()?.table::<Note>("notes")?;
    for id in ["a", "b", "c"] {
        notes.create(id.as_bytes(), &Note::new(id, ""))?;
    }

    let mut seen = Vec::new();
    let result = notes.iter(b"", |note| {
        seen.push(note.title.clone());
        if note.title == "b" {
            anyhow::bail!("stopped at {}", note.title);
        }
        Ok(())
    });
    let err = result.err().map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some("stopped at b"));
    assert_eq!(seen, ["a", "b"]);
    Ok(())
}

#[test]
fn test_undecodable_record() -> anyhow::Result<()> {
    let db = memory_db()?;
    db.table::<RawObject>("mixed")?
        .create(b"junk", &RawObject::new(vec![1, 2]))?;

    let err = db.table::<Note>("mixed")?.get(b"junk");
    assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::Encoding));
    Ok(())
}

#[test]
fn test_tables_and_databases_are_isolated() -> anyhow::Result<()> {
    let store = Datastore::open("mem://")?;
    let app = store.db("app")?;
    let other = store.db("other")?;

    let users = app.table::<RawObject>("users")?;
    let user = app.table::<RawObject>("user")?;
    let other_users = other.table::<RawObject>("users")?;

    users.create(b"x", &RawObject::new("users"))?;
    user.create(b"sx", &RawObject::new("user"))?;
    other_users.create(b"x", &RawObject::new("other"))?;

    assert_eq!(users.get(b"x")?.as_bytes(), b"users");
    assert_eq!(other_users.get(b"x")?.as_bytes(), b"other");
    assert!(user.get(b"x").is_err_and(|e| e.is_not_found()));

    let mut count = 0;
    users.iter(b"", |_| {
        count += 1;
        Ok::<_, KvError>(())
    })?;
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn test_same_name_as_versioned_table() -> anyhow::Result<()> {
    let db = memory_db()?;
    let versions = db.versioned_table::<Note>("t", sha256())?;
    let plain = db.table::<Note>("t")?;
    assert_eq!(plain.prefix(), versions.prefix());

    let digest = versions.create(b"x", &Note::new("versioned", ""))?;
    plain.create(b"y", &Note::new("plain", ""))?;

    let mut titles = Vec::new();
    plain.iter(b"", |note| {
        titles.push(note.title);
        Ok::<_, KvError>(())
    })?;
    assert_eq!(titles, ["plain"]);

    let mut titles = Vec::new();
    versions.iter(b"", |note| {
        titles.push(note.title);
        Ok::<_, KvError>(())
    })?;
    assert_eq!(titles, ["versioned"]);

    // Reserved ids cannot reach the versioned records.
    for id in [&b"ref/x"[..], b"object/x"] {
        let err = plain.delete(id);
        assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::InvalidArgument));
        let err = plain.get(id);
        assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::InvalidArgument));
        let err = plain.create(id, &Note::new("shadow", ""));
        assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::InvalidArgument));
        let err = plain.update(id, &Note::new("shadow", ""));
        assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::InvalidArgument));
    }
    let err = plain.iter(b"ref/", |_| Ok::<_, KvError>(()));
    assert!(matches!(err, Err(ref e) if e.kind() == ErrorKind::InvalidArgument));

    let (current, current_digest) = versions.get(b"x")?;
    assert_eq!(current.title, "versioned");
    assert_eq!(current_digest, digest);
    Ok(())
}

#[test]
fn test_records_survive_reopen() -> anyhow::Result<()> {
    let temp = TempStore::new()?;
    let url = TempStore::url_for(&temp.dir);

    let users = temp.store.db("app")?.table::<RawObject>("users")?;
    users.create(b"kept", &RawObject::new("yes"))?;
    users.create(b"dropped", &RawObject::new("no"))?;
    users.delete(b"dropped")?;
    drop(users);
    drop(temp.store);

    let users = Datastore::open(&url)?.db("app")?.table::<RawObject>("users")?;
    assert_eq!(users.get(b"kept")?.as_bytes(), b"yes");
    assert!(users.get(b"dropped").is_err_and(|e| e.is_not_found()));
    Ok(())
}
