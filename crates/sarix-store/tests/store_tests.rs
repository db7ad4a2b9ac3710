// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use sarix_app::{RoomMap, Session, display_name};
use sarix_store::{Store, validate_db_path};
use sarix_testkit::sample_room;

fn logged_in_session() -> Session {
    Session {
        base: "https://hs.example.org".to_owned(),
        access_token: Some("tok1".to_owned()),
        sync_cursor: Some("s2".to_owned()),
        user_id: Some("@alice:example.org".to_owned()),
    }
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path("/tmp/sarix.db").is_ok());
    assert!(validate_db_path(":memory:").is_ok());
}

#[test]
fn fresh_store_loads_logged_out_defaults() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let (session, rooms) = store.load_session()?;
    assert_eq!(session, Session::default());
    assert!(!session.is_logged_in());
    assert!(rooms.is_empty());
    Ok(())
}

#[test]
fn save_then_load_reproduces_session_and_rooms() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let session = logged_in_session();
    let mut rooms = RoomMap::new();
    rooms.insert(
        "!r1:example.org",
        sample_room("!r1:example.org", Some("Team"), &[("@bob:example.org", "hi")]),
    );
    rooms.insert(
        "!r2:example.org",
        sample_room("!r2:example.org", None, &[]),
    );

    store.save_session(&session, &rooms)?;
    let (loaded_session, loaded_rooms) = store.load_session()?;
    assert_eq!(loaded_session, session);
    assert_eq!(loaded_rooms, rooms);

    store.save_session(&loaded_session, &loaded_rooms)?;
    let (again_session, again_rooms) = store.load_session()?;
    assert_eq!(again_session, session);
    assert_eq!(again_rooms, rooms);
    Ok(())
}

#[test]
fn session_survives_reopening_the_database_file() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("sarix.db");

    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        let mut rooms = RoomMap::new();
        rooms.insert(
            "!r1:example.org",
            sample_room("!r1:example.org", Some("Team"), &[]),
        );
        store.save_session(&logged_in_session(), &rooms)?;
    }

    let store = Store::open(&path)?;
    store.bootstrap()?;
    let (session, rooms) = store.load_session()?;
    assert_eq!(session.access_token.as_deref(), Some("tok1"));
    let room = rooms.get("!r1:example.org").expect("room should persist");
    assert_eq!(display_name(room), "Team");
    Ok(())
}

#[test]
fn clearing_session_logs_out_but_keeps_schema() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.save_session(&logged_in_session(), &RoomMap::new())?;

    store.clear_session()?;
    let (session, rooms) = store.load_session()?;
    assert_eq!(session, Session::default());
    assert!(rooms.is_empty());

    store.bootstrap()?;
    Ok(())
}

#[test]
fn bootstrap_rejects_kv_table_missing_required_column() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);")?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `kv` is missing required columns"));
    assert!(message.contains("updated_at"));
    Ok(())
}
