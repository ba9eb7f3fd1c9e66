// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeDelta, TimeZone};
use tw_adapters::{FakeNotifyAdapter, FakeRegistryAdapter};
use tw_core::{FakeClock, JobState, RunTime};
use yare::parameterized;

const GRACE: Duration = Duration::from_secs(300);

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

fn minutes_ago(n: i64) -> RunTime {
    RunTime::At(now() - TimeDelta::minutes(n))
}

fn job(path: &str, state: JobState, next_run: RunTime) -> JobDescriptor {
    JobDescriptor::new(path, state).next_run(next_run)
}

fn cycle(
    registry: &FakeRegistryAdapter,
    notifier: &FakeNotifyAdapter,
) -> ScanCycle<FakeRegistryAdapter, FakeNotifyAdapter, FakeClock> {
    ScanCycle::new(
        registry.clone(),
        notifier.clone(),
        FakeClock::at(now()),
        AlertTemplate::new("HOST01"),
        Duration::from_secs(30),
    )
}

#[tokio::test]
async fn single_alert_lists_only_ready_overdue_jobs() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(job("\\A", JobState::Ready, minutes_ago(10)));
    registry.add_job(job("\\B", JobState::Running, minutes_ago(60)));
    registry.add_job(job("\\C", JobState::Ready, RunTime::NotSet));
    let notifier = FakeNotifyAdapter::new();

    let result = cycle(&registry, &notifier).run(GRACE).await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.examined, 3);
    assert_eq!(result.started_at, now());
    assert_eq!(result.alert, AlertStatus::Sent);
    let paths: Vec<_> = result.overdue.iter().map(|r| r.path.0.as_str()).collect();
    assert_eq!(paths, vec!["\\A"]);

    let sent = notifier.calls();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("HOST01"));
    assert!(sent[0].body.ends_with("- A\n"));
}

#[tokio::test]
async fn nothing_overdue_sends_nothing() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(job("\\Hourly", JobState::Ready, RunTime::At(now() + TimeDelta::minutes(30))));
    registry.add_job(job("\\Late but in grace", JobState::Ready, minutes_ago(4)));
    let notifier = FakeNotifyAdapter::new();

    let result = cycle(&registry, &notifier).run(GRACE).await.unwrap();

    assert!(result.ok);
    assert!(result.overdue.is_empty());
    assert_eq!(result.alert, AlertStatus::NotNeeded);
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn overdue_jobs_keep_walk_order() {
    let registry = FakeRegistryAdapter::new();
    registry.add_folder("\\Zeta");
    registry.add_folder("\\Alpha");
    registry.add_job(job("\\Alpha\\a", JobState::Ready, minutes_ago(20)));
    registry.add_job(job("\\Zeta\\z", JobState::Ready, minutes_ago(20)));
    registry.add_job(job("\\root", JobState::Ready, minutes_ago(20)));
    let notifier = FakeNotifyAdapter::new();

    let result = cycle(&registry, &notifier).run(GRACE).await.unwrap();

    let paths: Vec<_> = result.overdue.iter().map(|r| r.path.0.as_str()).collect();
    assert_eq!(paths, vec!["\\root", "\\Zeta\\z", "\\Alpha\\a"]);
    assert_eq!(notifier.calls().len(), 1);
    assert!(notifier.calls()[0]
        .body
        .ends_with("- root\n- Zeta\\z\n- Alpha\\a\n"));
}

#[tokio::test]
async fn unavailable_registry_abandons_scan() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(job("\\A", JobState::Ready, minutes_ago(10)));
    registry.set_unavailable(Some("service not running"));
    let notifier = FakeNotifyAdapter::new();

    let err = cycle(&registry, &notifier).run(GRACE).await.unwrap_err();

    assert!(matches!(err, ScanError::Registry(RegistryError::Unavailable(_))));
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn broken_folder_abandons_scan_without_partial_alert() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(job("\\A", JobState::Ready, minutes_ago(10)));
    registry.add_job(job("\\Locked\\b", JobState::Ready, minutes_ago(10)));
    registry.break_folder("\\Locked");
    let notifier = FakeNotifyAdapter::new();

    let err = cycle(&registry, &notifier).run(GRACE).await.unwrap_err();

    assert!(matches!(err, ScanError::Registry(RegistryError::Folder { .. })));
    assert!(notifier.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_registry_times_out() {
    let registry = FakeRegistryAdapter::new();
    registry.set_connect_delay(Duration::from_secs(120));
    let notifier = FakeNotifyAdapter::new();

    let err = cycle(&registry, &notifier).run(GRACE).await.unwrap_err();

    assert!(matches!(
        err,
        ScanError::Registry(RegistryError::Timeout(t)) if t == Duration::from_secs(30)
    ));
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn failed_delivery_still_completes_scan() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(job("\\A", JobState::Ready, minutes_ago(10)));
    let notifier = FakeNotifyAdapter::new();
    notifier.set_failure(Some("connection refused"));

    let result = cycle(&registry, &notifier).run(GRACE).await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.overdue.len(), 1);
    assert!(matches!(result.alert, AlertStatus::Failed(ref reason) if reason.contains("connection refused")));
    assert_eq!(notifier.calls().len(), 1);
}

#[parameterized(
    disabled = { JobState::Disabled },
    queued = { JobState::Queued },
    running = { JobState::Running },
    unknown = { JobState::Unknown },
)]
fn inactive_states_never_alert(state: JobState) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        let registry = FakeRegistryAdapter::new();
        registry.add_job(job("\\Stale", state, minutes_ago(600)));
        let notifier = FakeNotifyAdapter::new();

        let result = cycle(&registry, &notifier).run(GRACE).await.unwrap();

        assert!(result.ok);
        assert_eq!(result.examined, 1);
        assert!(notifier.calls().is_empty());
    });
}

#[tokio::test]
async fn unreadable_next_run_is_skipped() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(job("\\Odd", JobState::Ready, RunTime::Malformed("soon".to_string())));
    let notifier = FakeNotifyAdapter::new();

    let result = cycle(&registry, &notifier).run(GRACE).await.unwrap();

    assert!(result.ok);
    assert!(notifier.calls().is_empty());
}
