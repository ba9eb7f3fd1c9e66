// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time zone selection for cron evaluation and registry timestamps
//!
//! Everything inside taskwatch is an instant in UTC. A zone only matters at
//! the two edges: evaluating a calendar-based cron expression, and reading
//! the wall-clock times a job registry reports.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    #[error("unknown time zone: {0}")]
    Unknown(String),
}

/// Time zone a schedule or a registry is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleZone {
    /// The host's local zone
    #[default]
    Local,
    Utc,
    /// An IANA zone, e.g. `Europe/Brussels`
    Named(Tz),
}

impl ScheduleZone {
    /// Resolve a wall-clock time in this zone to a UTC instant.
    ///
    /// Returns `None` for a wall time skipped by a DST transition. An
    /// ambiguous wall time (clocks set back) resolves to the earlier instant.
    pub fn resolve(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ScheduleZone::Local => earliest(chrono::Local.from_local_datetime(naive)),
            ScheduleZone::Utc => Some(Utc.from_utc_datetime(naive)),
            ScheduleZone::Named(tz) => earliest(tz.from_local_datetime(naive)),
        }
    }
}

fn earliest<T: TimeZone>(result: LocalResult<DateTime<T>>) -> Option<DateTime<Utc>> {
    result.earliest().map(|dt| dt.with_timezone(&Utc))
}

impl FromStr for ScheduleZone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "local" | "Local" => Ok(ScheduleZone::Local),
            "utc" | "UTC" => Ok(ScheduleZone::Utc),
            name => name
                .parse::<Tz>()
                .map(ScheduleZone::Named)
                .map_err(|_| ZoneError::Unknown(name.to_string())),
        }
    }
}

impl fmt::Display for ScheduleZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleZone::Local => write!(f, "local"),
            ScheduleZone::Utc => write!(f, "utc"),
            ScheduleZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

impl Serialize for ScheduleZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScheduleZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod tests;
