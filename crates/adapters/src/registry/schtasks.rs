// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windows Task Scheduler adapter backed by `schtasks`
//!
//! `connect` runs `schtasks /Query /FO LIST /V` and keeps the parsed tree
//! until the next `connect`. The verbose list prints one block per trigger,
//! so a job with several triggers shows up several times; the first block
//! wins.

use super::{FolderPath, RegistryAdapter, RegistryError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tw_core::{JobDescriptor, JobState, RegistryConfig, RunTime, ScheduleZone};

const FOLDER_KEY: &str = "Folder";
const HOST_KEY: &str = "HostName";
const NAME_KEY: &str = "TaskName";
const STATUS_KEY: &str = "Status";
const NEXT_RUN_KEY: &str = "Next Run Time";
const LAST_RUN_KEY: &str = "Last Run Time";

/// Registry adapter that shells out to `schtasks`
#[derive(Clone)]
pub struct SchtasksRegistry {
    command: String,
    time_format: String,
    zone: ScheduleZone,
    snapshot: Arc<Mutex<Option<Snapshot>>>,
}

impl SchtasksRegistry {
    pub fn new(command: impl Into<String>, time_format: impl Into<String>, zone: ScheduleZone) -> Self {
        Self {
            command: command.into(),
            time_format: time_format.into(),
            zone,
            snapshot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(&config.command, &config.time_format, config.timezone)
    }

    fn with_snapshot<T>(
        &self,
        folder: &FolderPath,
        f: impl FnOnce(&FolderEntry) -> T,
    ) -> Result<T, RegistryError> {
        let guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = guard
            .as_ref()
            .ok_or_else(|| RegistryError::Unavailable("not connected".to_string()))?;
        snapshot
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
impl RegistryAdapter for SchtasksRegistry {
    async fn connect(&self) -> Result<(), RegistryError> {
        let output = Command::new(&self.command)
            .args(["/Query", "/FO", "LIST", "/V"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RegistryError::Unavailable(format!("{}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RegistryError::Unavailable(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let snapshot = Snapshot::parse(&stdout, &self.time_format, self.zone);
        tracing::debug!(
            folders = snapshot.folders.len(),
            "registry snapshot loaded"
        );
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        Ok(())
    }

    async fn subfolders(&self, folder: &FolderPath) -> Result<Vec<FolderPath>, RegistryError> {
        self.with_snapshot(folder, |entry| entry.subfolders.clone())
    }

    async fn jobs(&self, folder: &FolderPath) -> Result<Vec<JobDescriptor>, RegistryError> {
        self.with_snapshot(folder, |entry| entry.jobs.clone())
    }
}

#[derive(Debug, Default)]
struct FolderEntry {
    subfolders: Vec<FolderPath>,
    jobs: Vec<JobDescriptor>,
}

/// Parsed `schtasks` listing
#[derive(Debug)]
pub(crate) struct Snapshot {
    folders: HashMap<FolderPath, FolderEntry>,
}

impl Snapshot {
    pub(crate) fn parse(output: &str, time_format: &str, zone: ScheduleZone) -> Self {
        let mut parser = Parser {
            snapshot: Snapshot {
                folders: HashMap::from([(FolderPath::root(), FolderEntry::default())]),
            },
            seen: HashSet::new(),
            block: HashMap::new(),
            time_format,
            zone,
        };

        for line in output.lines() {
            let Some((key, value)) = line.split_once(':') else {
                parser.finish_block();
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                FOLDER_KEY => {
                    parser.finish_block();
                    parser.snapshot.ensure(&FolderPath::new(value));
                }
                HOST_KEY => {
                    parser.finish_block();
                    parser.block.insert(key, value);
                }
                _ => {
                    parser.block.insert(key, value);
                }
            }
        }
        parser.finish_block();
        parser.snapshot
    }

    /// Register a folder and its ancestors, keeping first-seen child order
    fn ensure(&mut self, folder: &FolderPath) {
        if self.folders.contains_key(folder) {
            return;
        }
        self.folders.insert(folder.clone(), FolderEntry::default());
        if let Some(parent) = folder.parent() {
            self.ensure(&parent);
            if let Some(entry) = self.folders.get_mut(&parent) {
                entry.subfolders.push(folder.clone());
            }
        }
    }
}

struct Parser<'a> {
    snapshot: Snapshot,
    seen: HashSet<String>,
    block: HashMap<&'a str, &'a str>,
    time_format: &'a str,
    zone: ScheduleZone,
}

impl<'a> Parser<'a> {
    fn finish_block(&mut self) {
        let block = std::mem::take(&mut self.block);
        let Some(name) = block.get(NAME_KEY).copied().filter(|n| !n.is_empty()) else {
            return;
        };
        if !self.seen.insert(name.to_string()) {
            return;
        }

        let field = |key: &str| block.get(key).copied().unwrap_or_default();
        let job = JobDescriptor::new(name, JobState::from_label(field(STATUS_KEY)))
            .last_run(RunTime::parse(field(LAST_RUN_KEY), self.time_format, self.zone))
            .next_run(RunTime::parse(field(NEXT_RUN_KEY), self.time_format, self.zone));

        let folder = FolderPath::of_job(name);
        self.snapshot.ensure(&folder);
        if let Some(entry) = self.snapshot.folders.get_mut(&folder) {
            entry.jobs.push(job);
        }
    }
}

#[cfg(test)]
#[path = "schtasks_tests.rs"]
mod tests;
