// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2026
// - Volker Schwaberow <volker@schwaberow.de>

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = ".feedhound.yaml";
pub const DEFAULT_INTERVAL: u64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Isolation {
    #[default]
    Process,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LedgerFlush {
    #[default]
    EndOfCycle,
    PerItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    feeds: Vec<String>,
    download_path: PathBuf,
    history_file: PathBuf,
    log_file: PathBuf,
    #[serde(default)]
    pid_file: Option<PathBuf>,
    #[serde(default)]
    daemon: bool,
    #[serde(default = "default_interval")]
    interval: u64,
    #[serde(default)]
    fetch_timeout: Option<u64>,
    #[serde(default = "default_user_agent")]
    user_agent: String,
    #[serde(default)]
    isolation: Isolation,
    #[serde(default)]
    ledger_flush: LedgerFlush,
    #[serde(default = "default_log_level")]
    log_level: String,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Config {
    /// A configuration with every optional key at its default.
    pub fn new(
        feeds: Vec<String>,
        download_path: PathBuf,
        history_file: PathBuf,
        log_file: PathBuf,
    ) -> Self {
        Self {
            feeds,
            download_path,
            history_file,
            log_file,
            pid_file: None,
            daemon: false,
            interval: DEFAULT_INTERVAL,
            fetch_timeout: None,
            user_agent: default_user_agent(),
            isolation: Isolation::default(),
            ledger_flush: LedgerFlush::default(),
            log_level: default_log_level(),
        }
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_CONFIG_FILE))
            .ok_or(ConfigError::HomeDirectoryNotFound)
    }

    /// Reads and parses `path`. Call [`Config::validate`] once command line
    /// overrides have been applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::Invalid(
                "interval must be at least one second".to_string(),
            ));
        }
        if self.daemon && self.pid_file.is_none() {
            return Err(ConfigError::Invalid(
                "pid_file is required in daemon mode".to_string(),
            ));
        }
        self.validate_cycle()
    }

    /// Checks only the keys a single cycle reads. The scheduling keys
    /// (`interval`, `daemon`, `pid_file`) belong to the supervisor, which may
    /// have overridden them on its command line.
    pub fn validate_cycle(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout == Some(0) {
            return Err(ConfigError::Invalid(
                "fetch_timeout must be at least one second".to_string(),
            ));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        for (name, path) in [
            ("download_path", &self.download_path),
            ("history_file", &self.history_file),
            ("log_file", &self.log_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// Creates the history and log files when missing and checks that the
    /// download directory exists.
    pub fn prepare_files(&self) -> Result<(), ConfigError> {
        for path in [&self.history_file, &self.log_file] {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigError::Io(path.clone(), e))?;
        }
        if !self.download_path.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "download_path {} is not a directory",
                self.download_path.display()
            )));
        }
        Ok(())
    }

    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn pid_file(&self) -> Option<&Path> {
        self.pid_file.as_deref()
    }

    pub fn set_pid_file(&mut self, pid_file: Option<PathBuf>) {
        self.pid_file = pid_file;
    }

    pub fn daemon(&self) -> bool {
        self.daemon
    }

    pub fn set_daemon(&mut self, daemon: bool) {
        self.daemon = daemon;
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn set_interval(&mut self, seconds: u64) {
        self.interval = seconds;
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout.map(Duration::from_secs)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    pub fn set_isolation(&mut self, isolation: Isolation) {
        self.isolation = isolation;
    }

    pub fn ledger_flush(&self) -> LedgerFlush {
        self.ledger_flush
    }

    pub fn set_ledger_flush(&mut self, ledger_flush: LedgerFlush) {
        self.ledger_flush = ledger_flush;
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn set_log_level(&mut self, level: &str) {
        self.log_level = level.to_string();
    }
}
