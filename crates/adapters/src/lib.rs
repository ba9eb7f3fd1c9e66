// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the job registry and alert delivery

pub mod notify;
pub mod registry;
pub mod traced;

pub use notify::{NoOpNotifyAdapter, Notification, NotifyAdapter, NotifyError, SmtpNotifier};
pub use registry::{FolderPath, RegistryAdapter, RegistryError, SchtasksRegistry};
pub use traced::{TracedNotifyAdapter, TracedRegistryAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use registry::{FakeRegistryAdapter, RegistryCall};
