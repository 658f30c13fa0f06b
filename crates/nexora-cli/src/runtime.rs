// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use nexora_app::{Activity, ActivityStorage, MemoryStorage};
use nexora_db::Store;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Storage chosen at startup: SQLite on disk, or process memory for `--demo`.
pub enum PortalStorage {
    Sqlite(Store),
    Memory(MemoryStorage),
}

impl ActivityStorage for PortalStorage {
    fn load(&mut self) -> Result<Option<Vec<Activity>>> {
        match self {
            Self::Sqlite(store) => store.load(),
            Self::Memory(storage) => storage.load(),
        }
    }

    fn save(&mut self, activities: &[Activity]) -> Result<()> {
        match self {
            Self::Sqlite(store) => store.save(activities),
            Self::Memory(storage) => storage.save(activities),
        }
    }
}

pub fn open_store(db_path: &Path) -> Result<Store> {
    let store = Store::open(db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or NEXORA_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    Ok(store)
}

/// Reads and decodes stored activities without seeding an empty store.
/// Returns the stored row count, or `None` when nothing is stored yet.
pub fn check_storage<S: ActivityStorage>(storage: &mut S) -> Result<Option<usize>> {
    let stored = storage.load().context("load stored activities")?;
    Ok(stored.map(|activities| activities.len()))
}

/// `NEXORA_LOG` wins over the configured filter.
pub fn resolve_log_filter(env_filter: Option<String>, configured: &str) -> Result<EnvFilter> {
    let directive = env_filter
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.to_owned());
    EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}; use a level such as \"info\""))
}

/// The terminal belongs to the TUI, so log lines go to a file.
pub fn init_logging(filter: EnvFilter, log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable file",
                log_path.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}
