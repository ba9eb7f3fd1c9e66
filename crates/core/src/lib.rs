// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tw-core: domain model for the taskwatch daemon
//!
//! This crate provides:
//! - A wall-clock abstraction with a fake for tests
//! - Cron schedules evaluated in a chosen time zone
//! - Job descriptors and the overdue classifier
//! - The configuration file model

pub mod clock;
pub mod config;
pub mod job;
pub mod schedule;
pub mod staleness;
pub mod zone;

pub use clock::{until_next_minute, Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError, LogConfig, MailConfig, RegistryConfig, ScheduleConfig};
pub use job::{JobDescriptor, JobPath, JobState, OverdueRecord, RunTime};
pub use schedule::{CronSchedule, ScheduleError};
pub use staleness::{classify, is_overdue, min_allowed, Verdict};
pub use zone::{ScheduleZone, ZoneError};
