// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op notifier for when mail is not configured.

use super::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Notifier that only logs.
///
/// Used when the configuration has no `[mail]` section.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(subject = %notification.subject, "mail not configured, alert not sent");
        Ok(())
    }
}
