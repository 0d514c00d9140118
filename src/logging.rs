// File: logging.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Routes all records to `log_file`, opened for append. `RUST_LOG` still
/// overrides `level`.
pub fn init_file_logging(log_file: &Path, level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    builder(level)
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("Logger already initialised")
}

pub fn init_console_logging(level: &str) -> Result<()> {
    builder(level)
        .target(Target::Stderr)
        .try_init()
        .context("Logger already initialised")
}

fn builder(level: &str) -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Info)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}: {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                record.level(),
                std::process::id(),
                record.target(),
                record.args()
            )
        });
    builder
}
