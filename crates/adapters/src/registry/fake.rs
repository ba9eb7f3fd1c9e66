// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake registry adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FolderPath, RegistryAdapter, RegistryError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tw_core::JobDescriptor;

/// Recorded registry call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Connect,
    Subfolders(FolderPath),
    Jobs(FolderPath),
}

#[derive(Debug, Default)]
struct FakeFolder {
    subfolders: Vec<FolderPath>,
    jobs: Vec<JobDescriptor>,
}

#[derive(Debug)]
struct FakeState {
    folders: HashMap<FolderPath, FakeFolder>,
    unavailable: Option<String>,
    broken: HashSet<FolderPath>,
    connect_delay: Option<Duration>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            folders: HashMap::from([(FolderPath::root(), FakeFolder::default())]),
            unavailable: None,
            broken: HashSet::new(),
            connect_delay: None,
        }
    }
}

impl FakeState {
    fn ensure(&mut self, folder: &FolderPath) {
        if self.folders.contains_key(folder) {
            return;
        }
        self.folders.insert(folder.clone(), FakeFolder::default());
        if let Some(parent) = folder.parent() {
            self.ensure(&parent);
            if let Some(entry) = self.folders.get_mut(&parent) {
                entry.subfolders.push(folder.clone());
            }
        }
    }
}

/// In-memory job tree for testing
#[derive(Clone, Default)]
pub struct FakeRegistryAdapter {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<Vec<RegistryCall>>>,
}

impl FakeRegistryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder (and any missing ancestors)
    pub fn add_folder(&self, path: &str) {
        self.lock().ensure(&FolderPath::new(path));
    }

    /// Add a job to the folder named by its path
    pub fn add_job(&self, job: JobDescriptor) {
        let folder = FolderPath::of_job(&job.path.0);
        let mut state = self.lock();
        state.ensure(&folder);
        if let Some(entry) = state.folders.get_mut(&folder) {
            entry.jobs.push(job);
        }
    }

    /// Make `connect` fail with the given reason, or succeed again with `None`
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.lock().unavailable = reason.map(str::to_string);
    }

    /// Make queries on one folder fail
    pub fn break_folder(&self, path: &str) {
        self.lock().broken.insert(FolderPath::new(path));
    }

    /// Make `connect` take this long before answering
    pub fn set_connect_delay(&self, delay: Duration) {
        self.lock().connect_delay = Some(delay);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: RegistryCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn folder<T>(
        &self,
        folder: &FolderPath,
        f: impl FnOnce(&FakeFolder) -> T,
    ) -> Result<T, RegistryError> {
        let state = self.lock();
        if state.broken.contains(folder) {
            return Err(RegistryError::Folder {
                folder: folder.clone(),
                reason: "access denied".to_string(),
            });
        }
        state
            .folders
            .get(folder)
            .map(f)
            .ok_or_else(|| RegistryError::Folder {
                folder: folder.clone(),
                reason: "folder not found".to_string(),
            })
    }
}

#[async_trait]
impl RegistryAdapter for FakeRegistryAdapter {
    async fn connect(&self) -> Result<(), RegistryError> {
        self.record(RegistryCall::Connect);
        let (delay, unavailable) = {
            let state = self.lock();
            (state.connect_delay, state.unavailable.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match unavailable {
            Some(reason) => Err(RegistryError::Unavailable(reason)),
            None => Ok(()),
        }
    }

    async fn subfolders(&self, folder: &FolderPath) -> Result<Vec<FolderPath>, RegistryError> {
        self.record(RegistryCall::Subfolders(folder.clone()));
        self.folder(folder, |f| f.subfolders.clone())
    }

    async fn jobs(&self, folder: &FolderPath) -> Result<Vec<JobDescriptor>, RegistryError> {
        self.record(RegistryCall::Jobs(folder.clone()));
        self.folder(folder, |f| f.jobs.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
