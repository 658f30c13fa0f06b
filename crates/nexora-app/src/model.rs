// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::ids::ActivityId;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    Pending,
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Call Scheduled")]
    CallScheduled,
}

impl ActivityStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Completed,
        Self::InProgress,
        Self::CallScheduled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::CallScheduled => "Call Scheduled",
        }
    }
}

/// One row of the client-activity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub client_name: String,
    pub company: String,
    pub phone: String,
    pub status: ActivityStatus,
}

impl Activity {
    /// First character of the client name, shown as the drawer avatar.
    pub fn initial(&self) -> Option<char> {
        self.client_name.chars().next()
    }
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}
