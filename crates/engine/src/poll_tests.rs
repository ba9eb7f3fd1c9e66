// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::alert::AlertTemplate;
use async_trait::async_trait;
use chrono::{TimeDelta, TimeZone};
use tw_adapters::{FakeNotifyAdapter, FakeRegistryAdapter, Notification, NotifyError};
use tw_core::{FakeClock, JobDescriptor, JobState, RunTime};

const GRACE: Duration = Duration::from_secs(300);

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, h, m, s).unwrap()
}

fn stale_registry() -> FakeRegistryAdapter {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(
        JobDescriptor::new("\\Backup", JobState::Ready).next_run(RunTime::At(at(9, 0, 0))),
    );
    registry
}

fn poll_loop<N: NotifyAdapter, C: Clock>(
    expression: &str,
    registry: &FakeRegistryAdapter,
    notifier: N,
    clock: C,
) -> PollLoop<FakeRegistryAdapter, N, C> {
    let cycle = ScanCycle::new(
        registry.clone(),
        notifier,
        clock.clone(),
        AlertTemplate::new("HOST01"),
        Duration::from_secs(30),
    );
    PollLoop::new(CronSchedule::parse(expression).unwrap(), GRACE, cycle, clock)
}

#[tokio::test]
async fn arms_for_first_occurrence() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    let poll = poll_loop("*/5 * * * *", &registry, FakeNotifyAdapter::new(), clock);

    assert_eq!(poll.state(), PollState::Armed(at(12, 5, 0)));
    assert_eq!(poll.next_wake(), Some(at(12, 5, 0)));
}

#[tokio::test]
async fn tick_before_wake_does_nothing() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    let notifier = FakeNotifyAdapter::new();
    let mut poll = poll_loop("*/5 * * * *", &registry, notifier.clone(), clock.clone());

    clock.set(at(12, 4, 0));
    assert!(poll.tick().await.is_none());
    assert!(registry.calls().is_empty());
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn tick_at_wake_scans_and_rearms() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    let notifier = FakeNotifyAdapter::new();
    let mut poll = poll_loop("*/5 * * * *", &registry, notifier.clone(), clock.clone());

    clock.set(at(12, 5, 0));
    let result = poll.tick().await.unwrap().unwrap();

    assert!(!result.ok);
    assert_eq!(notifier.calls().len(), 1);
    assert_eq!(poll.state(), PollState::Armed(at(12, 10, 0)));
}

#[tokio::test]
async fn failed_scan_still_rearms() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    registry.set_unavailable(Some("access denied"));
    let notifier = FakeNotifyAdapter::new();
    let mut poll = poll_loop("*/5 * * * *", &registry, notifier.clone(), clock.clone());

    clock.set(at(12, 5, 0));
    let outcome = poll.tick().await.unwrap();

    assert!(outcome.is_err());
    assert!(notifier.calls().is_empty());
    assert_eq!(poll.state(), PollState::Armed(at(12, 10, 0)));
}

#[tokio::test]
async fn late_tick_scans_once_and_skips_missed_occurrences() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    let notifier = FakeNotifyAdapter::new();
    let mut poll = poll_loop("*/5 * * * *", &registry, notifier.clone(), clock.clone());

    // Host was suspended across three occurrences
    clock.set(at(12, 17, 0));
    assert!(poll.tick().await.is_some());
    assert_eq!(poll.state(), PollState::Armed(at(12, 20, 0)));
    assert!(poll.tick().await.is_none());
    assert_eq!(notifier.calls().len(), 1);
}

/// Notifier that makes the scan appear to take a while
#[derive(Clone)]
struct SlowNotifier {
    clock: FakeClock,
    inner: FakeNotifyAdapter,
}

#[async_trait]
impl NotifyAdapter for SlowNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.clock.advance(Duration::from_secs(6 * 60));
        self.inner.send(notification).await
    }
}

#[tokio::test]
async fn rearms_from_time_after_scan() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    let notifier = SlowNotifier {
        clock: clock.clone(),
        inner: FakeNotifyAdapter::new(),
    };
    let mut poll = poll_loop("*/5 * * * *", &registry, notifier.clone(), clock.clone());

    clock.set(at(12, 5, 0));
    let result = poll.tick().await.unwrap().unwrap();

    // Scan started at 12:05 but finished at 12:11; 12:10 is skipped
    assert_eq!(result.started_at, at(12, 5, 0));
    assert_eq!(poll.state(), PollState::Armed(at(12, 15, 0)));
    assert_eq!(notifier.inner.calls().len(), 1);
}

#[tokio::test]
async fn exhausted_schedule_stays_idle() {
    let clock = FakeClock::at(at(12, 3, 0));
    let registry = stale_registry();
    let mut poll = poll_loop("0 0 0 1 1 * 2020", &registry, FakeNotifyAdapter::new(), clock.clone());

    assert_eq!(poll.state(), PollState::Exhausted);
    assert_eq!(poll.next_wake(), None);
    clock.advance(Duration::from_secs(3600));
    assert!(poll.tick().await.is_none());
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn sleeps_to_next_minute_boundary() {
    let clock = FakeClock::at(at(12, 5, 47));
    let registry = stale_registry();
    let poll = poll_loop("*/5 * * * *", &registry, FakeNotifyAdapter::new(), clock.clone());

    assert_eq!(poll.sleep_duration(), Duration::from_secs(13));
    clock.set(at(12, 6, 0));
    assert_eq!(poll.sleep_duration(), Duration::from_secs(60));
}

/// Wall clock that follows tokio's paused time from a fixed start
#[derive(Clone)]
struct PausedClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl PausedClock {
    fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.origin;
        self.base + TimeDelta::from_std(elapsed).unwrap()
    }
}

#[tokio::test(start_paused = true)]
async fn run_scans_on_schedule_until_shutdown() {
    let clock = PausedClock::starting_at(at(12, 3, 30));
    let registry = stale_registry();
    let notifier = FakeNotifyAdapter::new();
    let mut poll = poll_loop("*/5 * * * *", &registry, notifier.clone(), clock);

    // Scans at 12:05 and 12:10; shutdown lands at 12:13:30
    poll.run(tokio::time::sleep(Duration::from_secs(10 * 60)))
        .await;

    assert_eq!(notifier.calls().len(), 2);
    assert_eq!(poll.state(), PollState::Armed(at(12, 15, 0)));
}

#[tokio::test(start_paused = true)]
async fn run_stops_immediately_on_shutdown() {
    let clock = PausedClock::starting_at(at(12, 3, 30));
    let registry = stale_registry();
    let notifier = FakeNotifyAdapter::new();
    let mut poll = poll_loop("* * * * *", &registry, notifier.clone(), clock);

    poll.run(std::future::ready(())).await;

    assert!(notifier.calls().is_empty());
    assert!(registry.calls().is_empty());
}
