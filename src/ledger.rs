// File: ledger.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

//! Durable set of already processed feed items.
//!
//! The ledger is a plain text file holding one record per line. It is read
//! fully into memory at the start of a cycle, mutated in memory while items
//! are processed and written back as a whole at the end of the cycle.

use log::debug;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::{LedgerError, LedgerResult};

/// Opaque identifier of one processed item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryRecord(String);

impl HistoryRecord {
    /// Hex encoded MD5 digest of `key`.
    pub fn digest(key: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(key.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Accepts a raw ledger line. Blank lines are not records.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: BTreeSet<HistoryRecord>,
}

impl Ledger {
    /// Opens the ledger at `path`, creating an empty file when none exists.
    /// Nothing is read until [`Ledger::load`] is called.
    pub fn open(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::Io(path.clone(), e))?;

        Ok(Self {
            path,
            records: BTreeSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> LedgerResult<usize> {
        let file = File::open(&self.path).map_err(|e| LedgerError::Io(self.path.clone(), e))?;

        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| LedgerError::Io(self.path.clone(), e))?;
            if let Some(record) = HistoryRecord::parse(&line) {
                self.records.insert(record);
            }
        }

        debug!(
            "{} history records loaded from {}.",
            self.records.len(),
            self.path.display()
        );
        Ok(self.records.len())
    }

    pub fn contains(&self, record: &HistoryRecord) -> bool {
        if self.records.contains(record) {
            debug!("{} exists in history, skipping.", record);
            true
        } else {
            debug!("{} does not exist in history, continuing.", record);
            false
        }
    }

    /// Returns `false` when the record was already present.
    pub fn add(&mut self, record: HistoryRecord) -> bool {
        let label = record.to_string();
        let inserted = self.records.insert(record);
        if inserted {
            debug!("{} added to history.", label);
        } else {
            debug!("{} already recorded in history.", label);
        }
        inserted
    }

    /// Replaces the ledger file with the sorted in-memory set.
    ///
    /// The records are written to a temporary file next to the ledger which
    /// is then renamed over it, so readers see either the old or the new
    /// content.
    pub fn flush(&self) -> LedgerResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let tmp = NamedTempFile::new_in(&dir).map_err(|e| LedgerError::Io(dir.clone(), e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            for record in &self.records {
                writeln!(writer, "{}", record)
                    .map_err(|e| LedgerError::Io(tmp.path().to_path_buf(), e))?;
            }
            writer
                .flush()
                .map_err(|e| LedgerError::Io(tmp.path().to_path_buf(), e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| LedgerError::Io(tmp.path().to_path_buf(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| LedgerError::Persist(self.path.clone(), e))?;

        debug!(
            "Wrote {} history records to {}.",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }
}

