// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert delivery adapters

mod noop;
mod smtp;

pub use noop::NoOpNotifyAdapter;
pub use smtp::SmtpNotifier;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier misconfigured: {0}")]
    Config(String),
    #[error("could not build message: {0}")]
    Message(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// A rendered alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Adapter trait for alert delivery
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Deliver one alert
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
