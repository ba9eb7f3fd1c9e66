// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overdue-job classification
//!
//! Only a `Ready` job with a real next-run time can be overdue, and only
//! when that time falls before the oldest allowed instant
//! (`scan start - grace`). A running job is never flagged even when it is
//! behind schedule.

use crate::job::{JobDescriptor, JobState, RunTime};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Outcome of classifying one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not `Ready`; never a candidate
    Inactive(JobState),
    /// `Ready` but the registry reports no next run
    Unscheduled,
    /// Next-run text could not be read; the job is skipped
    Malformed(String),
    /// Next run is at or after the oldest allowed instant
    OnTime(DateTime<Utc>),
    /// Next run is before the oldest allowed instant
    Overdue(DateTime<Utc>),
}

impl Verdict {
    pub fn is_overdue(&self) -> bool {
        matches!(self, Verdict::Overdue(_))
    }

    /// Whether the job went through the time comparison at all
    pub fn is_candidate(&self) -> bool {
        matches!(self, Verdict::OnTime(_) | Verdict::Overdue(_))
    }
}

/// Oldest next-run instant still considered on time for a scan started at
/// `scan_start`
pub fn min_allowed(scan_start: DateTime<Utc>, grace: Duration) -> DateTime<Utc> {
    let grace = TimeDelta::from_std(grace).unwrap_or(TimeDelta::MAX);
    scan_start
        .checked_sub_signed(grace)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Classify a job against the oldest allowed next-run instant
pub fn classify(job: &JobDescriptor, min_allowed: DateTime<Utc>) -> Verdict {
    if job.state != JobState::Ready {
        return Verdict::Inactive(job.state);
    }
    match &job.next_run {
        RunTime::NotSet => Verdict::Unscheduled,
        RunTime::Malformed(raw) => Verdict::Malformed(raw.clone()),
        RunTime::At(next) if *next < min_allowed => Verdict::Overdue(*next),
        RunTime::At(next) => Verdict::OnTime(*next),
    }
}

/// Whether a job is runnable but overdue
pub fn is_overdue(job: &JobDescriptor, min_allowed: DateTime<Utc>) -> bool {
    classify(job, min_allowed).is_overdue()
}

#[cfg(test)]
#[path = "staleness_tests.rs"]
mod tests;
