// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: wiring adapters from configuration, one-shot scans,
//! and the long-running poll loop.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use tw_adapters::{
    NoOpNotifyAdapter, Notification, NotifyAdapter, NotifyError, SchtasksRegistry, SmtpNotifier,
    TracedNotifyAdapter, TracedRegistryAdapter,
};
use tw_core::{Config, ConfigError, CronSchedule, ScheduleError, SystemClock};
use tw_engine::{AlertTemplate, PollLoop, ScanCycle, ScanError, ScanResult};

/// Scan cycle with concrete adapter types (wrapped with tracing)
pub type DaemonCycle = ScanCycle<
    TracedRegistryAdapter<SchtasksRegistry>,
    TracedNotifyAdapter<AlertChannel>,
    SystemClock,
>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Mail setup failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("Invalid log filter {0:?}: {1}")]
    LogFilter(String, String),

    #[error("Log path has no file name: {0}")]
    LogPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
}

/// Where alerts go: SMTP when `[mail]` is configured, otherwise the log
#[derive(Clone)]
pub enum AlertChannel {
    Smtp(SmtpNotifier),
    LogOnly(NoOpNotifyAdapter),
}

#[async_trait]
impl NotifyAdapter for AlertChannel {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        match self {
            AlertChannel::Smtp(smtp) => smtp.send(notification).await,
            AlertChannel::LogOnly(noop) => noop.send(notification).await,
        }
    }
}

/// A configured daemon, ready to scan
pub struct Daemon {
    pub machine: String,
    pub schedule: CronSchedule,
    grace: Duration,
    cycle: DaemonCycle,
}

impl Daemon {
    /// Build the daemon from configuration
    pub fn startup(config: &Config) -> Result<Self, LifecycleError> {
        let schedule = CronSchedule::with_zone(&config.schedule.cron, config.schedule.timezone)?;
        let machine = machine_name();

        let channel = match &config.mail {
            Some(mail) => AlertChannel::Smtp(SmtpNotifier::from_config(mail)?),
            None => {
                info!("no [mail] section; alerts will only be logged");
                AlertChannel::LogOnly(NoOpNotifyAdapter::new())
            }
        };
        let template = AlertTemplate::from_mail(config.mail.as_ref(), machine.clone());
        let cycle = ScanCycle::new(
            TracedRegistryAdapter::new(SchtasksRegistry::from_config(&config.registry)),
            TracedNotifyAdapter::new(channel),
            SystemClock,
            template,
            config.registry.timeout,
        );

        Ok(Self {
            machine,
            schedule,
            grace: config.schedule.grace,
            cycle,
        })
    }

    /// Run a single scan right now
    pub async fn scan_once(&self) -> Result<ScanResult, LifecycleError> {
        Ok(self.cycle.run(self.grace).await?)
    }

    /// Poll on schedule until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut poll = PollLoop::new(self.schedule, self.grace, self.cycle, SystemClock);
        poll.run(shutdown).await;
    }
}

/// Host name used in alerts, resolved once
fn machine_name() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!(error = %e, "could not resolve host name");
            "unknown-host".to_string()
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
