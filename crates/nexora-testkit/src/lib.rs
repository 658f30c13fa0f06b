// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use nexora_app::{Activity, ActivityId, ActivityStatus, ActivityStorage};
use std::path::PathBuf;
use time::{Date, Duration, Month};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const COMPANY_ADJECTIVES: [&str; 12] = [
    "Premier",
    "Central",
    "Reliable",
    "Bright",
    "Quality",
    "Summit",
    "Eagle",
    "Heritage",
    "Greenleaf",
    "Northwind",
    "Hartley",
    "Apex",
];
const COMPANY_SUFFIXES: [&str; 6] = ["Holdings", "Partners", "Ltd", "Group", "Industries", "Co"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Reproducible activity rows for tests and demo tables.
#[derive(Debug, Clone)]
pub struct ActivityFaker {
    rng: DeterministicRng,
}

impl ActivityFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn activity(&mut self, id: ActivityId) -> Activity {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let adjective = self.pick(&COMPANY_ADJECTIVES);
        let suffix = self.pick(&COMPANY_SUFFIXES);
        let company = format!("{adjective} {suffix}");
        let phone = format!("077-{:07}", self.rng.int_n(10_000_000));
        let status = ActivityStatus::ALL[self.rng.int_n(ActivityStatus::ALL.len())];
        let offset = self.rng.int_n(365) as i64;
        Activity {
            id,
            date: fixture_date().saturating_add(Duration::days(offset)),
            client_name: format!("{first} {last}"),
            company,
            phone,
            status,
        }
    }

    /// `count` rows numbered `#1001`, `#1002`, ... in table order.
    pub fn activities(&mut self, count: usize) -> Vec<Activity> {
        (0..count)
            .map(|index| self.activity(ActivityId::for_collection_len(index)))
            .collect()
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

/// Storage whose writes always fail; loads return the configured rows.
#[derive(Debug, Clone, Default)]
pub struct FailingStorage {
    pub stored: Option<Vec<Activity>>,
    pub attempts: usize,
}

impl ActivityStorage for FailingStorage {
    fn load(&mut self) -> Result<Option<Vec<Activity>>> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, _activities: &[Activity]) -> Result<()> {
        self.attempts += 1;
        bail!("storage is read-only")
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("nexora.db");
    Ok((dir, db_path))
}

pub fn fixture_date() -> Date {
    Date::from_calendar_date(2024, Month::January, 1).unwrap_or(Date::MIN)
}
