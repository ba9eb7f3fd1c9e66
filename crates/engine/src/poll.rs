// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minute-aligned polling loop
//!
//! The loop wakes at each whole minute, compares the clock to the armed
//! wake time, and runs a scan when it is due. The next wake is computed
//! from the clock *after* the scan, so occurrences that passed while a
//! scan was running are skipped rather than replayed.

use crate::error::ScanError;
use crate::scan::{ScanCycle, ScanResult};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tw_adapters::{NotifyAdapter, RegistryAdapter};
use tw_core::{until_next_minute, Clock, CronSchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next occurrence
    Armed(DateTime<Utc>),
    Scanning,
    /// The schedule has no further occurrences
    Exhausted,
}

pub struct PollLoop<R, N, C> {
    schedule: CronSchedule,
    grace: Duration,
    cycle: ScanCycle<R, N, C>,
    clock: C,
    state: PollState,
}

impl<R, N, C> PollLoop<R, N, C>
where
    R: RegistryAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    /// Create a loop armed for the first occurrence after now
    pub fn new(schedule: CronSchedule, grace: Duration, cycle: ScanCycle<R, N, C>, clock: C) -> Self {
        let state = arm(&schedule, clock.now());
        Self {
            schedule,
            grace,
            cycle,
            clock,
            state,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn next_wake(&self) -> Option<DateTime<Utc>> {
        match self.state {
            PollState::Armed(at) => Some(at),
            _ => None,
        }
    }

    /// How long to sleep before the next tick
    pub fn sleep_duration(&self) -> Duration {
        until_next_minute(self.clock.now())
    }

    /// Check the clock and scan if the armed wake time has been reached.
    ///
    /// Returns the scan outcome when a scan ran.
    pub async fn tick(&mut self) -> Option<Result<ScanResult, ScanError>> {
        let now = self.clock.now();
        let PollState::Armed(next_wake) = self.state else {
            return None;
        };
        if now < next_wake {
            tracing::trace!(now = %now, next_wake = %next_wake, "not due");
            return None;
        }

        self.state = PollState::Scanning;
        let outcome = self.cycle.run(self.grace).await;
        if let Err(e) = &outcome {
            tracing::error!(error = %e, "scan failed");
        }
        self.state = arm(&self.schedule, self.clock.now());
        Some(outcome)
    }

    /// Tick at every whole minute until `shutdown` resolves.
    ///
    /// Shutdown is only observed between ticks; a scan in progress runs to
    /// completion (or to its registry timeout) first.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("poll loop stopping");
                    return;
                }
                _ = tokio::time::sleep(self.sleep_duration()) => {}
            }
            self.tick().await;
        }
    }
}

fn arm(schedule: &CronSchedule, from: DateTime<Utc>) -> PollState {
    match schedule.next_after(from) {
        Ok(at) => {
            tracing::info!(next_wake = %at, "next scan scheduled");
            PollState::Armed(at)
        }
        Err(e) => {
            tracing::error!(error = %e, "no further scans; staying idle");
            PollState::Exhausted
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
