// File: store.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

//! Write-once storage of downloaded payloads.
//!
//! Payloads are streamed into a hidden temporary file inside the download
//! directory and renamed to their final name only once complete. The rename
//! never replaces an existing file.

use futures::{Stream, StreamExt};
use log::{debug, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::errors::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(StoredFile),
    AlreadyExists(PathBuf),
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub async fn save<S, B, E>(&self, stream: S, filename: &str) -> StoreResult<SaveOutcome>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: fmt::Display,
    {
        let target = self.target_path(filename);

        if tokio::fs::try_exists(&target)
            .await
            .map_err(|e| StoreError::Io(target.clone(), e))?
        {
            warn!("Torrent exists, not overwriting: {}.", target.display());
            return Ok(SaveOutcome::AlreadyExists(target));
        }

        let tmp = tempfile::Builder::new()
            .prefix(".feedhound-")
            .suffix(".part")
            .tempfile_in(&self.root)
            .map_err(|e| StoreError::Io(self.root.clone(), e))?;
        let tmp_path = tmp.path().to_path_buf();
        let handle = tmp
            .reopen()
            .map_err(|e| StoreError::Io(tmp_path.clone(), e))?;
        let mut file = tokio::fs::File::from_std(handle);

        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        let mut stream = std::pin::pin!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StoreError::Stream(e.to_string()))?;
            let bytes = chunk.as_ref();
            hasher.update(bytes);
            size += bytes.len() as u64;
            file.write_all(bytes)
                .await
                .map_err(|e| StoreError::Io(tmp_path.clone(), e))?;
        }

        file.flush()
            .await
            .map_err(|e| StoreError::Io(tmp_path.clone(), e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::Io(tmp_path.clone(), e))?;
        drop(file);

        match tmp.persist_noclobber(&target) {
            Ok(_) => {
                debug!("Wrote torrent: {}.", target.display());
                Ok(SaveOutcome::Written(StoredFile {
                    path: target,
                    size,
                    sha256: format!("{:x}", hasher.finalize()),
                }))
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                warn!("Torrent exists, not overwriting: {}.", target.display());
                Ok(SaveOutcome::AlreadyExists(target))
            }
            Err(e) => Err(StoreError::Io(target, e.error)),
        }
    }
}
