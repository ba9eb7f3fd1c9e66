// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One pass over the registry
//!
//! A scan fixes its reference instant when it starts, walks every folder,
//! classifies each job against `start - grace`, and sends at most one alert.
//! A failure to reach or walk the registry abandons the scan with nothing
//! reported; a failure to deliver the alert is logged and the scan still
//! counts as completed.

use crate::alert::AlertTemplate;
use crate::error::ScanError;
use crate::walker::RegistryWalker;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tw_adapters::{NotifyAdapter, RegistryAdapter, RegistryError};
use tw_core::{classify, min_allowed, Clock, JobDescriptor, OverdueRecord, Verdict};

/// What happened to the alert of a completed scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertStatus {
    /// Nothing was overdue
    NotNeeded,
    Sent,
    /// Delivery failed; the reason was logged
    Failed(String),
}

/// Outcome of a completed scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// True when no job was overdue
    pub ok: bool,
    /// Overdue jobs in the order the walk met them
    pub overdue: Vec<OverdueRecord>,
    /// Jobs seen, whatever their state
    pub examined: usize,
    pub started_at: DateTime<Utc>,
    pub alert: AlertStatus,
}

/// Scans a registry and reports overdue jobs through a notifier
pub struct ScanCycle<R, N, C> {
    registry: R,
    notifier: N,
    clock: C,
    template: AlertTemplate,
    registry_timeout: Duration,
}

impl<R, N, C> ScanCycle<R, N, C>
where
    R: RegistryAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(
        registry: R,
        notifier: N,
        clock: C,
        template: AlertTemplate,
        registry_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            notifier,
            clock,
            template,
            registry_timeout,
        }
    }

    /// Run one scan, flagging ready jobs due before `now - grace`
    pub async fn run(&self, grace: Duration) -> Result<ScanResult, ScanError> {
        let started_at = self.clock.now();
        let oldest = min_allowed(started_at, grace);
        tracing::info!(
            started_at = %started_at,
            oldest_allowed = %oldest,
            "scanning registry"
        );

        let walk = self.walk(oldest);
        let (overdue, examined) = match tokio::time::timeout(self.registry_timeout, walk).await {
            Ok(result) => result?,
            Err(_) => return Err(RegistryError::Timeout(self.registry_timeout).into()),
        };

        let alert = if overdue.is_empty() {
            AlertStatus::NotNeeded
        } else {
            self.send_alert(&overdue).await
        };

        tracing::info!(examined, overdue = overdue.len(), "scan complete");
        Ok(ScanResult {
            ok: overdue.is_empty(),
            overdue,
            examined,
            started_at,
            alert,
        })
    }

    async fn walk(
        &self,
        oldest: DateTime<Utc>,
    ) -> Result<(Vec<OverdueRecord>, usize), RegistryError> {
        let mut walker = RegistryWalker::open(&self.registry).await?;
        let mut overdue = Vec::new();
        let mut examined = 0;
        while let Some(job) = walker.next().await? {
            examined += 1;
            if inspect(&job, oldest) {
                overdue.push(OverdueRecord::from(&job));
            }
        }
        tracing::debug!(folders = walker.folders_visited(), "walk finished");
        Ok((overdue, examined))
    }

    async fn send_alert(&self, overdue: &[OverdueRecord]) -> AlertStatus {
        let notification = self.template.render(overdue);
        match self.notifier.send(&notification).await {
            Ok(()) => AlertStatus::Sent,
            Err(e) => {
                tracing::error!(error = %e, overdue = overdue.len(), "alert not delivered");
                AlertStatus::Failed(e.to_string())
            }
        }
    }
}

/// Log a job's verdict; true when it is overdue
fn inspect(job: &JobDescriptor, oldest: DateTime<Utc>) -> bool {
    let verdict = classify(job, oldest);
    if verdict.is_candidate() {
        tracing::debug!(job = %job.path, "investigating");
    }
    match &verdict {
        Verdict::Inactive(state) => {
            tracing::trace!(job = %job.path, state = %state, "skipped, not ready");
        }
        Verdict::Unscheduled => {
            tracing::debug!(job = %job.path, "skipped, no next run");
        }
        Verdict::Malformed(raw) => {
            tracing::warn!(job = %job.path, next_run = %raw, "skipped, unreadable next run");
        }
        Verdict::OnTime(next) => {
            tracing::info!(job = %job.path, next_run = %next, last_run = %job.last_run, "OK");
        }
        Verdict::Overdue(next) => {
            tracing::warn!(
                job = %job.path,
                next_run = %next,
                last_run = %job.last_run,
                "RUN TIME IN THE PAST"
            );
        }
    }
    verdict.is_overdue()
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
