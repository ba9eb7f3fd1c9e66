// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job descriptors as read from a scheduled-job registry
//!
//! Descriptors are snapshots taken during one scan. Nothing here is
//! persisted, and a path is not assumed to identify the same job in the
//! next scan.

use crate::zone::ScheduleZone;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// Hierarchical job identifier: folder segments followed by the job name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobPath(pub String);

impl JobPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path without the registry's leading separator, as shown to people
    pub fn display_name(&self) -> &str {
        self.0.strip_prefix('\\').unwrap_or(&self.0)
    }
}

impl fmt::Display for JobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<&str> for JobPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Runnable state of a registered job, numbered as the registry reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Unknown = 0,
    Disabled = 1,
    Queued = 2,
    Ready = 3,
    Running = 4,
}

impl JobState {
    /// Map a registry state code; codes outside 0-4 are `Unknown`
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => JobState::Disabled,
            2 => JobState::Queued,
            3 => JobState::Ready,
            4 => JobState::Running,
            _ => JobState::Unknown,
        }
    }

    /// Map a registry status label; unrecognised labels are `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "disabled" => JobState::Disabled,
            "queued" => JobState::Queued,
            "ready" => JobState::Ready,
            "running" => JobState::Running,
            _ => JobState::Unknown,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Unknown => write!(f, "unknown"),
            JobState::Disabled => write!(f, "disabled"),
            JobState::Queued => write!(f, "queued"),
            JobState::Ready => write!(f, "ready"),
            JobState::Running => write!(f, "running"),
        }
    }
}

/// Placeholder date the registry reports for "no time": the OLE automation
/// epoch, 1899-12-30 00:00:00. Only this exact value is the sentinel; any
/// other date, however old, is a real timestamp.
pub const SENTINEL_DATE: (i32, u32, u32) = (1899, 12, 30);

/// Text values the registry prints in place of a timestamp
pub const SENTINEL_LABELS: [&str; 3] = ["N/A", "Never", ""];

/// The sentinel as a naive timestamp
pub fn sentinel() -> Option<NaiveDateTime> {
    let (year, month, day) = SENTINEL_DATE;
    NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A last/next run time as reported by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTime {
    At(DateTime<Utc>),
    /// The registry's sentinel: never run (last) or not scheduled (next)
    NotSet,
    /// Reported text that could not be read as a time; kept for logging
    Malformed(String),
}

impl RunTime {
    /// Interpret a wall-clock timestamp in `zone`
    pub fn from_naive(naive: NaiveDateTime, zone: ScheduleZone) -> Self {
        if Some(naive) == sentinel() {
            return RunTime::NotSet;
        }
        match zone.resolve(&naive) {
            Some(at) => RunTime::At(at),
            None => RunTime::Malformed(naive.to_string()),
        }
    }

    /// Interpret registry text using a chrono format string
    pub fn parse(text: &str, format: &str, zone: ScheduleZone) -> Self {
        let trimmed = text.trim();
        if SENTINEL_LABELS.iter().any(|l| l.eq_ignore_ascii_case(trimmed)) {
            return RunTime::NotSet;
        }
        match NaiveDateTime::parse_from_str(trimmed, format) {
            Ok(naive) => Self::from_naive(naive, zone),
            Err(_) => RunTime::Malformed(trimmed.to_string()),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            RunTime::At(at) => Some(*at),
            _ => None,
        }
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunTime::At(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S")),
            RunTime::NotSet => write!(f, "-"),
            RunTime::Malformed(raw) => write!(f, "{:?}", raw),
        }
    }
}

/// One job as seen during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub path: JobPath,
    pub state: JobState,
    pub last_run: RunTime,
    pub next_run: RunTime,
}

impl JobDescriptor {
    pub fn new(path: impl Into<JobPath>, state: JobState) -> Self {
        Self {
            path: path.into(),
            state,
            last_run: RunTime::NotSet,
            next_run: RunTime::NotSet,
        }
    }

    pub fn last_run(mut self, at: RunTime) -> Self {
        self.last_run = at;
        self
    }

    pub fn next_run(mut self, at: RunTime) -> Self {
        self.next_run = at;
        self
    }
}

/// A job found overdue, copied out of its descriptor at classification time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueRecord {
    pub path: JobPath,
    pub last_run: RunTime,
    pub next_run: RunTime,
}

impl From<&JobDescriptor> for OverdueRecord {
    fn from(job: &JobDescriptor) -> Self {
        Self {
            path: job.path.clone(),
            last_run: job.last_run.clone(),
            next_run: job.next_run.clone(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
