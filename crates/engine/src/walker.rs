// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Breadth-first enumeration of a job registry
//!
//! All jobs of a folder come out before anything from its subfolders, and
//! subfolders are visited in the order the registry lists them. Folders are
//! fetched one at a time as the caller pulls jobs.

use std::collections::VecDeque;
use tw_adapters::{FolderPath, RegistryAdapter, RegistryError};
use tw_core::JobDescriptor;

pub struct RegistryWalker<'a, R> {
    registry: &'a R,
    pending: VecDeque<FolderPath>,
    buffered: VecDeque<JobDescriptor>,
    folders_visited: usize,
}

impl<'a, R: RegistryAdapter> RegistryWalker<'a, R> {
    /// Connect to the registry and position the walk at its root
    pub async fn open(registry: &'a R) -> Result<Self, RegistryError> {
        registry.connect().await?;
        Ok(Self {
            registry,
            pending: VecDeque::from([registry.root()]),
            buffered: VecDeque::new(),
            folders_visited: 0,
        })
    }

    /// Next job in breadth-first order, or `None` when the tree is exhausted
    pub async fn next(&mut self) -> Result<Option<JobDescriptor>, RegistryError> {
        loop {
            if let Some(job) = self.buffered.pop_front() {
                return Ok(Some(job));
            }
            let Some(folder) = self.pending.pop_front() else {
                return Ok(None);
            };
            let jobs = self.registry.jobs(&folder).await?;
            let subfolders = self.registry.subfolders(&folder).await?;
            self.folders_visited += 1;
            self.buffered.extend(jobs);
            self.pending.extend(subfolders);
        }
    }

    /// Drain the remaining walk into a vector
    pub async fn collect(mut self) -> Result<Vec<JobDescriptor>, RegistryError> {
        let mut jobs = Vec::new();
        while let Some(job) = self.next().await? {
            jobs.push(job);
        }
        Ok(jobs)
    }

    pub fn folders_visited(&self) -> usize {
        self.folders_visited
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
