// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notify::FakeNotifyAdapter;
use crate::registry::FakeRegistryAdapter;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tw_core::JobState;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

// =============================================================================
// Precondition validation tests
// =============================================================================

#[tokio::test]
async fn traced_notify_rejects_empty_body() {
    let fake = FakeNotifyAdapter::new();
    let traced = TracedNotifyAdapter::new(fake.clone());

    let result = traced.send(&Notification::new("subject", "  \n")).await;

    assert!(matches!(result, Err(NotifyError::Message(_))));
    assert!(fake.calls().is_empty(), "inner adapter must not be called");
}

#[tokio::test]
async fn traced_adapters_pass_results_through() {
    let registry = FakeRegistryAdapter::new();
    registry.add_job(JobDescriptor::new("\\Job", JobState::Ready));
    let traced = TracedRegistryAdapter::new(registry);

    traced.connect().await.unwrap();
    let jobs = traced.jobs(&traced.root()).await.unwrap();
    assert_eq!(jobs.len(), 1);
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_connect_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let registry = FakeRegistryAdapter::new();
        registry.set_unavailable(Some("service stopped"));
        TracedRegistryAdapter::new(registry).connect().await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("registry.connect"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("connect failed") && logs.contains("service stopped"),
        "Should log the failure. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_jobs_logs_folder_and_count() {
    let (logs, _) = with_tracing(|| async {
        let registry = FakeRegistryAdapter::new();
        registry.add_job(JobDescriptor::new("\\Ops\\Rotate", JobState::Ready));
        let traced = TracedRegistryAdapter::new(registry);
        traced.connect().await.unwrap();
        traced.jobs(&FolderPath::new("\\Ops")).await
    });

    assert!(logs.contains("jobs listed"), "Logs:\n{}", logs);
    assert!(logs.contains("\\Ops"), "Should log folder. Logs:\n{}", logs);
    assert!(logs.contains("count=1"), "Should log count. Logs:\n{}", logs);
}

#[test]
fn traced_send_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedNotifyAdapter::new(FakeNotifyAdapter::new());
        traced
            .send(&Notification::new("Tasks late", "body text"))
            .await
    });

    assert!(result.is_ok());
    assert!(logs.contains("notify.send"), "Logs:\n{}", logs);
    assert!(logs.contains("Tasks late"), "Should log subject. Logs:\n{}", logs);
    assert!(logs.contains("sending"), "Logs:\n{}", logs);
    assert!(logs.contains("sent"), "Logs:\n{}", logs);
}

#[test]
fn traced_send_logs_transport_error() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeNotifyAdapter::new();
        fake.set_failure(Some("relay refused"));
        TracedNotifyAdapter::new(fake)
            .send(&Notification::new("Tasks late", "body"))
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("send failed"), "Logs:\n{}", logs);
    assert!(logs.contains("relay refused"), "Logs:\n{}", logs);
}
