// File: pidfile.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::errors::SupervisorError;

/// Marker file holding the supervisor's PID.
///
/// Its presence is the single-instance signal: creating it fails when it
/// already exists. The marker is removed by [`PidFile::remove`] on clean
/// termination. It is not re-checked while the supervisor runs, so deleting
/// it by hand does not stop a running instance.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    removed: bool,
}

impl PidFile {
    pub fn create(path: &Path) -> Result<Self, SupervisorError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(SupervisorError::AlreadyRunning(path.to_path_buf()))
            }
            Err(e) => return Err(SupervisorError::PidFile(path.to_path_buf(), e)),
        };

        let written = writeln!(file, "{}", std::process::id()).and_then(|_| file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(path);
            return Err(SupervisorError::PidFile(path.to_path_buf(), e));
        }

        debug!("Wrote PID marker {}.", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_pid(path: &Path) -> Option<u32> {
        fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    pub fn remove(mut self) -> Result<(), SupervisorError> {
        self.removed = true;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed PID marker {}.", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("PID marker {} was already gone.", self.path.display());
                Ok(())
            }
            Err(e) => Err(SupervisorError::PidFile(self.path.clone(), e)),
        }
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if !self.removed {
            let _ = fs::remove_file(&self.path);
        }
    }
}
