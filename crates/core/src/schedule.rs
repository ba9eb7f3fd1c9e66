// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron schedule parsing and next-occurrence calculation
//!
//! Accepts classic 5-field cron (`minute hour day month weekday`), the
//! 6-field form with a leading seconds column, a trailing year column, and
//! the usual `@daily`-style shortcuts. Occurrences are computed in the
//! schedule's zone and handed back as UTC instants.
//!
//! When both day-of-month and day-of-week are restricted (neither starts
//! with `*` or `?`), a day matches if either field does, as in classic
//! cron. The cron crate requires both, so such expressions are kept as two
//! schedules whose occurrences are merged.

use crate::zone::ScheduleZone;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing or evaluating a schedule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid cron expression {expression:?}: {reason}")]
    InvalidCron { expression: String, reason: String },
    #[error("schedule {0:?} has no further occurrences")]
    NoMoreOccurrences(String),
}

/// A parsed cron expression bound to a time zone
#[derive(Clone)]
pub struct CronSchedule {
    expression: String,
    zone: ScheduleZone,
    /// One schedule, or two when the day fields are OR-ed
    inner: Vec<cron::Schedule>,
}

impl CronSchedule {
    /// Parse an expression evaluated in UTC
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        Self::with_zone(expression, ScheduleZone::Utc)
    }

    /// Parse an expression evaluated in the given zone
    pub fn with_zone(expression: &str, zone: ScheduleZone) -> Result<Self, ScheduleError> {
        let inner = normalize(expression)?
            .iter()
            .map(|normalized| cron::Schedule::from_str(normalized).map_err(|e| invalid(expression, e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            expression: expression.trim().to_string(),
            zone,
            inner,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn zone(&self) -> ScheduleZone {
        self.zone
    }

    /// The earliest matching instant strictly after `after`
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        self.upcoming(after, 1)
            .into_iter()
            .next()
            .ok_or_else(|| ScheduleError::NoMoreOccurrences(self.expression.clone()))
    }

    /// Up to `n` matching instants strictly after `after`, ascending
    pub fn upcoming(&self, after: DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
        let mut run: Vec<DateTime<Utc>> = self
            .inner
            .iter()
            .flat_map(|schedule| self.upcoming_in_zone(schedule, after, n))
            .collect();
        run.sort_unstable();
        run.dedup();
        run.truncate(n);
        run
    }

    fn upcoming_in_zone(
        &self,
        schedule: &cron::Schedule,
        after: DateTime<Utc>,
        n: usize,
    ) -> Vec<DateTime<Utc>> {
        match self.zone {
            ScheduleZone::Utc => schedule.after(&after).take(n).collect(),
            ScheduleZone::Local => schedule
                .after(&after.with_timezone(&chrono::Local))
                .take(n)
                .map(|dt| dt.with_timezone(&Utc))
                .collect(),
            ScheduleZone::Named(tz) => schedule
                .after(&after.with_timezone(&tz))
                .take(n)
                .map(|dt| dt.with_timezone(&Utc))
                .collect(),
        }
    }
}

impl fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronSchedule")
            .field("expression", &self.expression)
            .field("zone", &self.zone)
            .finish()
    }
}

fn invalid(expression: &str, reason: impl fmt::Display) -> ScheduleError {
    ScheduleError::InvalidCron {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

/// Rewrite an expression into the seconds-first dialect the cron crate
/// reads. Yields two expressions when the day fields must be OR-ed.
fn normalize(expression: &str) -> Result<Vec<String>, ScheduleError> {
    let trimmed = expression.trim();
    if trimmed.starts_with('@') {
        return shortcut(trimmed)
            .map(|s| vec![s.to_string()])
            .ok_or_else(|| invalid(expression, "unknown shortcut"));
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    let (mut fields, day_or) = match fields.len() {
        5 => {
            let day_or = restricted(fields[2]) && restricted(fields[4]);
            let mut out = vec!["0".to_string()];
            out.extend(fields[..4].iter().map(|f| f.to_string()));
            out.push(weekday_names(fields[4]));
            (out, day_or)
        }
        6 | 7 => {
            let day_or = restricted(fields[3]) && restricted(fields[5]);
            (fields.iter().map(|f| f.to_string()).collect::<Vec<_>>(), day_or)
        }
        n => {
            return Err(invalid(
                expression,
                format!("expected 5, 6 or 7 fields, got {}", n),
            ))
        }
    };

    if !day_or {
        return Ok(vec![fields.join(" ")]);
    }
    // Seconds-first: day of month at 3, day of week at 5
    let mut by_month_day = fields.clone();
    by_month_day[5] = "*".to_string();
    fields[3] = "*".to_string();
    Ok(vec![by_month_day.join(" "), fields.join(" ")])
}

fn restricted(field: &str) -> bool {
    !(field.starts_with('*') || field.starts_with('?'))
}

fn shortcut(expression: &str) -> Option<&'static str> {
    match expression.to_ascii_lowercase().as_str() {
        "@yearly" | "@annually" => Some("0 0 0 1 1 *"),
        "@monthly" => Some("0 0 0 1 * *"),
        "@weekly" => Some("0 0 0 * * SUN"),
        "@daily" | "@midnight" => Some("0 0 0 * * *"),
        "@hourly" => Some("0 0 * * * *"),
        _ => None,
    }
}

const WEEKDAYS: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Classic cron numbers weekdays 0-7 from Sunday; the cron crate counts 1-7
/// from Sunday. Names mean the same thing to both, so numbers become names.
/// A range ending at 7 wraps past Saturday and is split or expanded, since
/// `SUN` sorts first for the cron crate.
fn weekday_names(field: &str) -> String {
    field.split(',').map(weekday_item).collect::<Vec<_>>().join(",")
}

fn weekday_item(item: &str) -> String {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };
    let with_step = |base: String| match step {
        Some(step) => format!("{}/{}", base, step),
        None => base,
    };

    if let Some((day, nth)) = base.split_once('#') {
        return with_step(format!("{}#{}", weekday_name(day), nth));
    }
    let Some((lo, hi)) = base.split_once('-') else {
        return with_step(weekday_name(base));
    };
    match (lo.parse::<usize>(), hi) {
        (Ok(lo), "7") if lo <= 7 => match step {
            None if lo == 0 => "*".to_string(),
            None if lo == 7 => WEEKDAYS[7].to_string(),
            None => format!("{}-SAT,SUN", WEEKDAYS[lo]),
            Some(step) => match step.parse::<usize>() {
                Ok(n) if n > 0 => (lo..=7)
                    .step_by(n)
                    .map(|d| WEEKDAYS[d])
                    .collect::<Vec<_>>()
                    .join(","),
                _ => with_step(format!("{}-SUN", WEEKDAYS[lo])),
            },
        },
        _ => with_step(format!("{}-{}", weekday_name(lo), weekday_name(hi))),
    }
}

fn weekday_name(token: &str) -> String {
    match token.parse::<usize>() {
        Ok(n) if n < WEEKDAYS.len() => WEEKDAYS[n].to_string(),
        _ => token.to_string(),
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
