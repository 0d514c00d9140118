// File: cycle.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use std::path::Path;

use super::load_config;
use crate::logging;
use crate::pipeline::run_cycle;

/// Child side of process isolation. The report goes to stdout as a single
/// JSON line; everything else goes to the log file. Scheduling keys were
/// validated by the supervisor after its own overrides, so they are not
/// checked again here.
pub async fn execute(config_path: &Path, log_level: Option<&str>) -> Result<()> {
    let config = load_config(config_path, log_level)?;
    config.validate_cycle()?;
    config.prepare_files()?;

    logging::init_file_logging(config.log_file(), config.log_level())?;

    let report = run_cycle(&config).await?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
