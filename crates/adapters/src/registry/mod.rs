// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled-job registry adapters
//!
//! The registry is an external, read-only tree: folders hold jobs and
//! further folders. Every scan starts with `connect`, which gives a fresh
//! view; nothing is cached from one scan to the next.

mod schtasks;

pub use schtasks::SchtasksRegistry;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRegistryAdapter, RegistryCall};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tw_core::JobDescriptor;

/// Path of a registry folder; the root is `\`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderPath(String);

impl FolderPath {
    pub const SEPARATOR: char = '\\';

    pub fn root() -> Self {
        Self(Self::SEPARATOR.to_string())
    }

    /// Normalise a folder path: leading separator, no trailing one
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim().trim_matches(Self::SEPARATOR);
        if trimmed.is_empty() {
            Self::root()
        } else {
            Self(format!("{}{}", Self::SEPARATOR, trimmed))
        }
    }

    /// Folder holding the job at `job_path`
    pub fn of_job(job_path: &str) -> Self {
        match job_path.trim().rsplit_once(Self::SEPARATOR) {
            Some((folder, _)) => Self::new(folder),
            None => Self::root(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(&format!("{}{}{}", self.0, Self::SEPARATOR, name))
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self::of_job(&self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from registry queries
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),
    #[error("registry query timed out after {0:?}")]
    Timeout(Duration),
    #[error("registry folder {folder}: {reason}")]
    Folder { folder: FolderPath, reason: String },
}

/// Read-only access to a scheduled-job registry
#[async_trait]
pub trait RegistryAdapter: Clone + Send + Sync + 'static {
    /// Open a fresh view of the registry
    async fn connect(&self) -> Result<(), RegistryError>;

    /// Folder the job tree starts at
    fn root(&self) -> FolderPath {
        FolderPath::root()
    }

    /// Direct subfolders, in the order the registry reports them
    async fn subfolders(&self, folder: &FolderPath) -> Result<Vec<FolderPath>, RegistryError>;

    /// Jobs directly inside a folder, in the order the registry reports them
    async fn jobs(&self, folder: &FolderPath) -> Result<Vec<JobDescriptor>, RegistryError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
