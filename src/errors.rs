// File: errors.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(String),
    HomeDirectoryNotFound,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Cannot read configuration {}: {}", path.display(), e),
            Self::Parse(e) => write!(f, "Configuration is not valid YAML: {}", e),
            Self::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::HomeDirectoryNotFound => write!(f, "Home directory not found"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
            Self::HomeDirectoryNotFound => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Parse(error)
    }
}

#[derive(Debug)]
pub enum LedgerError {
    Io(PathBuf, std::io::Error),
    Persist(PathBuf, tempfile::PersistError),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "History file {}: {}", path.display(), e),
            Self::Persist(path, e) => {
                write!(f, "Failed to replace history file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Persist(_, e) => Some(e),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io(PathBuf, std::io::Error),
    Stream(String),
    NotADirectory(PathBuf),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "I/O error on {}: {}", path.display(), e),
            Self::Stream(msg) => write!(f, "Download interrupted: {}", msg),
            Self::NotADirectory(path) => {
                write!(f, "Download path is not a directory: {}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Stream(_) => None,
            Self::NotADirectory(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum FeedError {
    Io(PathBuf, std::io::Error),
    Http(String, reqwest::Error),
    Parse(String, rss::Error),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Cannot read feed {}: {}", path.display(), e),
            Self::Http(url, e) => write!(f, "Cannot fetch feed {}: {}", url, e),
            Self::Parse(source, e) => write!(f, "Cannot parse feed {}: {}", source, e),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Http(_, e) => Some(e),
            Self::Parse(_, e) => Some(e),
        }
    }
}

#[derive(Debug)]
pub enum SupervisorError {
    AlreadyRunning(PathBuf),
    PidFile(PathBuf, std::io::Error),
    Spawn(std::io::Error),
    CycleFailed(String),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning(path) => write!(
                f,
                "Another instance appears to be running (PID file {} exists)",
                path.display()
            ),
            Self::PidFile(path, e) => write!(f, "PID file {}: {}", path.display(), e),
            Self::Spawn(e) => write!(f, "Failed to spawn cycle: {}", e),
            Self::CycleFailed(msg) => write!(f, "Cycle failed: {}", msg),
        }
    }
}

impl std::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AlreadyRunning(_) => None,
            Self::PidFile(_, e) => Some(e),
            Self::Spawn(e) => Some(e),
            Self::CycleFailed(_) => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
pub type StoreResult<T> = Result<T, StoreError>;
