// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use nexora_app::{
    ACTIVITIES_KEY, Activity, ActivityStorage, decode_activities, encode_activities,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

pub const APP_NAME: &str = "nexora";

const KV_TABLE: &str = "kv_entries";
const KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS kv_entries (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );
";

/// Key-value persistence backed by a single SQLite table.
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
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("create key-value schema")?;
        validate_schema(&self.conn)
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read stored value {key}"))
    }

    pub fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert stored value {key}"))?;
        Ok(())
    }

    /// Returns whether a value was stored under `key`.
    pub fn delete_raw(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?", params![key])
            .with_context(|| format!("delete stored value {key}"))?;
        Ok(removed > 0)
    }

    pub fn load_activities(&self) -> Result<Option<Vec<Activity>>> {
        let Some(raw) = self.get_raw(ACTIVITIES_KEY)? else {
            return Ok(None);
        };
        let activities = decode_activities(&raw)?;
        debug!(count = activities.len(), "read activities from sqlite");
        Ok(Some(activities))
    }

    pub fn save_activities(&self, activities: &[Activity]) -> Result<()> {
        let raw = encode_activities(activities)?;
        self.put_raw(ACTIVITIES_KEY, &raw)?;
        debug!(count = activities.len(), "wrote activities to sqlite");
        Ok(())
    }

    /// Drops the stored table so the next start seeds the default rows.
    pub fn clear_activities(&self) -> Result<bool> {
        self.delete_raw(ACTIVITIES_KEY)
    }
}

impl ActivityStorage for Store {
    fn load(&mut self) -> Result<Option<Vec<Activity>>> {
        self.load_activities()
    }

    fn save(&mut self, activities: &[Activity]) -> Result<()> {
        self.save_activities(activities)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("NEXORA_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set NEXORA_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("nexora.db"))
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

fn validate_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({KV_TABLE})"))
        .context("inspect key-value table")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("list key-value columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read key-value columns")?;

    let missing = KV_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|column| column == *required))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "table `{KV_TABLE}` is missing required columns: {}; move the database aside and restart",
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
