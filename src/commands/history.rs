// File: history.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2026
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use super::{load_config, print_info, print_success, print_warning};
use crate::cli::{HistoryAction, HistoryArgs};
use crate::ledger::{HistoryRecord, Ledger};

pub async fn execute(args: &HistoryArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path, None)?;
    let mut ledger = open_ledger(config.history_file())?;

    match &args.action {
        HistoryAction::List => list(&ledger),
        HistoryAction::Check { link } => check(&ledger, link),
        HistoryAction::Compact => compact(&mut ledger)?,
    }
    Ok(())
}

fn open_ledger(path: &Path) -> Result<Ledger> {
    let mut ledger = Ledger::open(path)?;
    ledger
        .load()
        .with_context(|| format!("Failed to read history {}", path.display()))?;
    Ok(ledger)
}

fn list(ledger: &Ledger) {
    if ledger.is_empty() {
        print_warning(&format!("No history in {}", ledger.path().display()));
        return;
    }
    for record in ledger.iter() {
        println!("{}", record);
    }
    print_info(&format!("{} records", ledger.len()));
}

fn check(ledger: &Ledger, link: &str) {
    let record = HistoryRecord::digest(link);
    if ledger.contains(&record) {
        print_success(&format!("{} was already processed ({})", link, record.to_string().dimmed()));
    } else {
        print_warning(&format!("{} has not been processed yet ({})", link, record.to_string().dimmed()));
    }
}

fn compact(ledger: &mut Ledger) -> Result<()> {
    ledger.flush()?;
    print_success(&format!(
        "Rewrote {} with {} records",
        ledger.path().display(),
        ledger.len()
    ));
    Ok(())
}
