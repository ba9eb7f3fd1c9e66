// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::notify::{Notification, NotifyAdapter, NotifyError};
use crate::registry::{FolderPath, RegistryAdapter, RegistryError};
use async_trait::async_trait;
use tracing::Instrument;
use tw_core::JobDescriptor;

/// Wrapper that adds tracing to any RegistryAdapter
#[derive(Clone)]
pub struct TracedRegistryAdapter<R> {
    inner: R,
}

impl<R> TracedRegistryAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: RegistryAdapter> RegistryAdapter for TracedRegistryAdapter<R> {
    async fn connect(&self) -> Result<(), RegistryError> {
        let span = tracing::info_span!("registry.connect");
        async {
            tracing::debug!("connecting");
            let start = std::time::Instant::now();
            let result = self.inner.connect().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "connected"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "connect failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn root(&self) -> FolderPath {
        self.inner.root()
    }

    async fn subfolders(&self, folder: &FolderPath) -> Result<Vec<FolderPath>, RegistryError> {
        let result = self.inner.subfolders(folder).await;
        match &result {
            Ok(found) => tracing::trace!(folder = %folder, count = found.len(), "subfolders"),
            Err(e) => tracing::warn!(folder = %folder, error = %e, "subfolder query failed"),
        }
        result
    }

    async fn jobs(&self, folder: &FolderPath) -> Result<Vec<JobDescriptor>, RegistryError> {
        let result = self.inner.jobs(folder).await;
        match &result {
            Ok(found) => tracing::debug!(folder = %folder, count = found.len(), "jobs listed"),
            Err(e) => tracing::warn!(folder = %folder, error = %e, "job query failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotifyAdapter<N> {
    inner: N,
}

impl<N> TracedNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotifyAdapter<N> {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notify.send", subject = %notification.subject);
        async {
            // Precondition: an alert always has a body
            if notification.body.trim().is_empty() {
                tracing::error!("refusing to send an empty alert");
                return Err(NotifyError::Message("alert body is empty".to_string()));
            }

            tracing::info!(body_len = notification.body.len(), "sending");
            let start = std::time::Instant::now();
            let result = self.inner.send(notification).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "sent"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "send failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
