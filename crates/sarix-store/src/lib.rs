// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use sarix_app::{Room, RoomMap, Session};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

pub const APP_NAME: &str = "sarix";

const REQUIRED_COLUMNS: &[&str] = &["key", "value", "updated_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    Base,
    AccessToken,
    SyncToken,
    UserId,
    Rooms,
}

impl SessionKey {
    pub const ALL: [Self; 5] = [
        Self::Base,
        Self::AccessToken,
        Self::SyncToken,
        Self::UserId,
        Self::Rooms,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::AccessToken => "access_token",
            Self::SyncToken => "sync_token",
            Self::UserId => "user_id",
            Self::Rooms => "rooms",
        }
    }
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if table_exists(&self.conn, "kv")? {
            validate_schema(&self.conn)?;
            return Ok(());
        }
        self.conn
            .execute_batch(include_str!("sql/schema.sql"))
            .context("create schema")
    }

    /// Reads the persisted session. Missing keys keep their defaults, so a
    /// fresh database yields an empty, logged-out session.
    pub fn load_session(&self) -> Result<(Session, RoomMap)> {
        let mut session = Session::default();
        if let Some(base) = self.get_raw(SessionKey::Base)? {
            session.base = base;
        }
        session.access_token = self.get_raw(SessionKey::AccessToken)?;
        session.sync_cursor = self.get_raw(SessionKey::SyncToken)?;
        session.user_id = self.get_raw(SessionKey::UserId)?;

        let rooms = match self.get_raw(SessionKey::Rooms)? {
            Some(raw) => decode_rooms(&raw),
            None => RoomMap::new(),
        };
        debug!(
            rooms = rooms.len(),
            logged_in = session.is_logged_in(),
            "loaded session"
        );
        Ok((session, rooms))
    }

    pub fn save_session(&self, session: &Session, rooms: &RoomMap) -> Result<()> {
        let rooms_json = serde_json::to_string(rooms).context("encode room snapshot")?;
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin session save")?;
        put_raw(&tx, SessionKey::Base, Some(&session.base))?;
        put_raw(&tx, SessionKey::AccessToken, session.access_token.as_deref())?;
        put_raw(&tx, SessionKey::SyncToken, session.sync_cursor.as_deref())?;
        put_raw(&tx, SessionKey::UserId, session.user_id.as_deref())?;
        put_raw(&tx, SessionKey::Rooms, Some(&rooms_json))?;
        tx.commit().context("commit session save")?;
        debug!(rooms = rooms.len(), "saved session");
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin session clear")?;
        for key in SessionKey::ALL {
            put_raw(&tx, key, None)?;
        }
        tx.commit().context("commit session clear")
    }

    fn get_raw(&self, key: SessionKey) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?",
                params![key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read session key {}", key.as_str()))
    }
}

fn put_raw(conn: &Connection, key: SessionKey, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        conn.execute("DELETE FROM kv WHERE key = ?", params![key.as_str()])
            .with_context(|| format!("delete session key {}", key.as_str()))?;
        return Ok(());
    };

    let now = now_rfc3339()?;
    conn.execute(
        "
        INSERT INTO kv (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
          value = excluded.value,
          updated_at = excluded.updated_at
        ",
        params![key.as_str(), value, now],
    )
    .with_context(|| format!("upsert session key {}", key.as_str()))?;
    Ok(())
}

fn decode_rooms(raw: &str) -> RoomMap {
    match serde_json::from_str::<BTreeMap<String, Room>>(raw) {
        Ok(rooms) => rooms.into_iter().collect(),
        Err(error) => {
            warn!(%error, "stored room snapshot is unreadable; starting with no rooms");
            RoomMap::new()
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("SARIX_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let app_dir = data_dir()?;
    Ok(app_dir.join("sarix.db"))
}

pub fn data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set SARIX_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            params![table],
            |row| row.get(0),
        )
        .with_context(|| format!("check table {table}"))?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('kv')")
        .context("inspect kv table")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("list kv columns")?
        .collect::<rusqlite::Result<Vec<String>>>()
        .context("read kv columns")?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !columns.iter().any(|name| name == column))
        .collect();
    if !missing.is_empty() {
        bail!(
            "table `kv` is missing required columns: {}; point [storage].db_path at a sarix database",
            missing.join(", ")
        );
    }
    Ok(())
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

#[cfg(test)]
mod tests {
    use super::{SessionKey, Store};
    use anyhow::Result;

    #[test]
    fn absent_fields_are_deleted_not_stored_as_placeholders() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        let (session, rooms) = store.load_session()?;
        store.save_session(&session, &rooms)?;

        assert_eq!(store.get_raw(SessionKey::AccessToken)?, None);
        assert_eq!(store.get_raw(SessionKey::SyncToken)?, None);
        assert_eq!(
            store.get_raw(SessionKey::Base)?.as_deref(),
            Some("https://matrix.org")
        );
        assert_eq!(store.get_raw(SessionKey::Rooms)?.as_deref(), Some("{}"));
        Ok(())
    }

    #[test]
    fn unreadable_room_blob_loads_as_empty_map() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.raw_connection().execute(
            "INSERT INTO kv (key, value, updated_at) VALUES ('rooms', '{not json', 'now')",
            [],
        )?;

        let (_, rooms) = store.load_session()?;
        assert!(rooms.is_empty());
        Ok(())
    }
}
