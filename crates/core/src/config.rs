// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration
//!
//! Loaded once at startup from a TOML file. There is no reload: a changed
//! file takes effect on the next start.

use crate::zone::ScheduleZone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name shown in the startup banner
    #[serde(default = "default_name")]
    pub name: String,
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Absent means alerts are only logged
    #[serde(default)]
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

/// When to scan and how late a job may be
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    pub cron: String,
    #[serde(with = "humantime_serde", default = "default_grace")]
    pub grace: Duration,
    #[serde(default)]
    pub timezone: ScheduleZone,
}

/// How to query the job registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default = "default_command")]
    pub command: String,
    /// chrono format of the timestamps the registry prints
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// Zone the registry's wall-clock times are in
    #[serde(default)]
    pub timezone: ScheduleZone,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            time_format: default_time_format(),
            timezone: ScheduleZone::Local,
            timeout: default_timeout(),
        }
    }
}

/// SMTP alert settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
    pub from: String,
    pub to: Vec<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Header line; the machine name is appended
    #[serde(default = "default_text")]
    pub text: String,
    /// Heading above the list of overdue jobs
    #[serde(default = "default_list_text")]
    pub list_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log file; stderr when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            filter: default_filter(),
        }
    }
}

fn default_name() -> String {
    "taskwatch".to_string()
}

fn default_grace() -> Duration {
    Duration::from_secs(300)
}

fn default_command() -> String {
    "schtasks".to_string()
}

fn default_time_format() -> String {
    "%m/%d/%Y %I:%M:%S %p".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_port() -> u16 {
    25
}

/// Alert subject when none is configured
pub const DEFAULT_SUBJECT: &str = "Scheduled tasks overdue";
/// Alert header line when none is configured; the machine name follows
pub const DEFAULT_TEXT: &str = "One or more scheduled tasks did not run on";
/// Heading above the overdue list when none is configured
pub const DEFAULT_LIST_TEXT: &str = "Overdue tasks";

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_list_text() -> String {
    DEFAULT_LIST_TEXT.to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.cron.trim().is_empty() {
            return Err(ConfigError::Invalid("schedule.cron is empty".into()));
        }
        if self.registry.command.trim().is_empty() {
            return Err(ConfigError::Invalid("registry.command is empty".into()));
        }
        if self.registry.timeout.is_zero() {
            return Err(ConfigError::Invalid("registry.timeout must be positive".into()));
        }
        if let Some(mail) = &self.mail {
            if mail.to.iter().all(|to| to.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "mail.to needs at least one recipient".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
