// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};

use crate::Activity;

/// Key the activity list lives under in the key-value store.
pub const ACTIVITIES_KEY: &str = "activities";

/// Write-through persistence for the activity table.
pub trait ActivityStorage {
    /// `None` means nothing has been stored yet.
    fn load(&mut self) -> Result<Option<Vec<Activity>>>;
    fn save(&mut self, activities: &[Activity]) -> Result<()>;
}

/// Process-local storage, used for `--demo` sessions and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    stored: Option<Vec<Activity>>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activities(activities: Vec<Activity>) -> Self {
        Self {
            stored: Some(activities),
            saves: 0,
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ActivityStorage for MemoryStorage {
    fn load(&mut self) -> Result<Option<Vec<Activity>>> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, activities: &[Activity]) -> Result<()> {
        self.stored = Some(activities.to_vec());
        self.saves += 1;
        Ok(())
    }
}

pub fn encode_activities(activities: &[Activity]) -> Result<String> {
    serde_json::to_string(activities).context("encode activities as JSON")
}

pub fn decode_activities(raw: &str) -> Result<Vec<Activity>> {
    serde_json::from_str(raw).with_context(|| {
        format!("decode stored `{ACTIVITIES_KEY}` value; reset it with `nexora --reset`")
    })
}
