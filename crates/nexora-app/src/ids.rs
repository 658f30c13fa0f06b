// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset added to the collection size when numbering new activities.
pub const ACTIVITY_ID_BASE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Numbers the next activity from the current collection size.
    ///
    /// The result depends only on `collection_len`, so removing a row and
    /// adding another can hand out an identifier that is still in use.
    pub fn for_collection_len(collection_len: usize) -> Self {
        Self(format!("#{}", ACTIVITY_ID_BASE + collection_len + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ActivityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityId;

    #[test]
    fn numbering_follows_collection_size() {
        assert_eq!(ActivityId::for_collection_len(0).as_str(), "#1001");
        assert_eq!(ActivityId::for_collection_len(11).as_str(), "#1012");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ActivityId::from("#1005")).expect("serialize id");
        assert_eq!(json, "\"#1005\"");
    }
}
