// File: pipeline.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

//! One cycle over all configured feeds.
//!
//! For every item: identify, consult the ledger, fetch, store, record. All
//! failures below the ledger are resolved here by skipping the item and
//! logging; only ledger I/O errors abort the cycle.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{Config, LedgerFlush};
use crate::errors::LedgerResult;
use crate::feed::{FeedItem, FeedSource};
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::identifier::identify;
use crate::ledger::Ledger;
use crate::store::{SaveOutcome, Store, StoredFile};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub feeds_processed: usize,
    pub feeds_failed: usize,
    pub items_seen: usize,
    pub malformed: usize,
    pub already_seen: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub stored: usize,
    pub collisions: usize,
    pub store_failures: usize,
    pub ledger_records: usize,
}

impl CycleReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Malformed,
    AlreadySeen,
    FetchFailed,
    Stored(StoredFile),
    Collision(PathBuf),
    StoreFailed,
}

pub struct Pipeline<'a> {
    fetcher: &'a Fetcher,
    store: &'a Store,
    ledger: &'a mut Ledger,
    flush: LedgerFlush,
    report: CycleReport,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        store: &'a Store,
        ledger: &'a mut Ledger,
        flush: LedgerFlush,
    ) -> Self {
        Self {
            fetcher,
            store,
            ledger,
            flush,
            report: CycleReport {
                started_at: Utc::now(),
                ..Default::default()
            },
        }
    }

    /// Loads one feed and processes its items. A feed that cannot be loaded
    /// is logged and counted; the cycle carries on.
    pub async fn process_feed(&mut self, source: &FeedSource) -> LedgerResult<()> {
        let items = match source.load(self.fetcher).await {
            Ok(items) => items,
            Err(e) => {
                error!("Skipping feed: {}", e);
                self.report.feeds_failed += 1;
                return Ok(());
            }
        };

        self.report.feeds_processed += 1;
        for item in &items {
            self.process_item(item).await?;
        }
        Ok(())
    }

    pub async fn process_item(&mut self, item: &FeedItem) -> LedgerResult<ItemOutcome> {
        self.report.items_seen += 1;

        let Some(target) = identify(item) else {
            self.report.malformed += 1;
            return Ok(ItemOutcome::Malformed);
        };

        debug!(
            "Record for {} is {}.",
            item.link.as_deref().unwrap_or_default(),
            target.record
        );

        if self.ledger.contains(&target.record) {
            self.report.already_seen += 1;
            return Ok(ItemOutcome::AlreadySeen);
        }

        let download = match self.fetcher.fetch(&target.url).await {
            FetchOutcome::Fetched(download) => download,
            FetchOutcome::Failed(_) => {
                self.report.fetch_failures += 1;
                return Ok(ItemOutcome::FetchFailed);
            }
        };
        self.report.fetched += 1;
        debug!(
            "Fetched {} with HTTP {}, length {}.",
            download.url(),
            download.status(),
            download
                .content_length()
                .map_or_else(|| "unknown".to_string(), |len| len.to_string())
        );

        let outcome = match self.store.save(download.into_stream(), &target.filename).await {
            Ok(SaveOutcome::Written(stored)) => {
                self.report.stored += 1;
                ItemOutcome::Stored(stored)
            }
            // The record is still added below: the item counts as handled
            // even though nothing new was written.
            Ok(SaveOutcome::AlreadyExists(path)) => {
                self.report.collisions += 1;
                ItemOutcome::Collision(path)
            }
            Err(e) => {
                error!("Failed to store {}, skipping: {}", target.url, e);
                self.report.store_failures += 1;
                return Ok(ItemOutcome::StoreFailed);
            }
        };

        self.ledger.add(target.record);
        if self.flush == LedgerFlush::PerItem {
            self.ledger.flush()?;
        }
        Ok(outcome)
    }

    /// Flushes the ledger and closes the report.
    pub fn finish(mut self) -> LedgerResult<CycleReport> {
        self.ledger.flush()?;
        self.report.ledger_records = self.ledger.len();
        self.report.finished_at = Utc::now();
        Ok(self.report)
    }
}

/// Runs one complete cycle: fresh ledger load, every feed, one flush.
pub async fn run_cycle(config: &Config) -> Result<CycleReport> {
    let mut ledger = Ledger::open(config.history_file())?;
    ledger
        .load()
        .with_context(|| format!("Failed to load {}", config.history_file().display()))?;

    let fetcher = Fetcher::new(config.fetch_timeout(), config.user_agent())
        .context("Failed to build HTTP client")?;
    let store = Store::new(config.download_path())?;

    let mut pipeline = Pipeline::new(&fetcher, &store, &mut ledger, config.ledger_flush());
    for feed in config.feeds() {
        pipeline.process_feed(&FeedSource::parse(feed)).await?;
    }
    let report = pipeline.finish()?;

    info!(
        "Cycle finished in {} ms: {} feeds ({} failed), {} items, {} new, {} already seen, {} fetch failures, {} collisions.",
        report.duration_ms(),
        report.feeds_processed,
        report.feeds_failed,
        report.items_seen,
        report.stored,
        report.already_seen,
        report.fetch_failures,
        report.collisions
    );
    Ok(report)
}
