// File: run.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::{load_config, print_info, print_report};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::logging;
use crate::pipeline::run_cycle;
use crate::supervisor::{cancel_on_signals, CycleRunner, Supervisor};

pub async fn execute(args: &RunArgs, config_path: &Path, log_level: Option<&str>) -> Result<()> {
    let mut config = load_config(config_path, log_level)?;
    apply_overrides(&mut config, args);
    config.validate()?;
    config.prepare_files()?;

    logging::init_file_logging(config.log_file(), config.log_level())?;
    info!(
        "{} {} starting with {} feeds.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.feeds().len()
    );

    if !config.daemon() {
        let report = run_cycle(&config).await?;
        print_report(&report);
        return Ok(());
    }

    let runner = CycleRunner::for_config(&config, config_path)?;
    let cancel = CancellationToken::new();
    cancel_on_signals(cancel.clone());

    print_info(&format!(
        "Polling {} feeds every {}s, logging to {}",
        config.feeds().len(),
        config.interval().as_secs(),
        config.log_file().display()
    ));

    let mut supervisor = Supervisor::new(runner, config.interval(), cancel)
        .with_pid_file(config.pid_file().map(Path::to_path_buf));
    let cycles = supervisor
        .run()
        .await
        .context("Supervisor stopped")?;

    info!("Exiting after {} cycles.", cycles);
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if args.daemon {
        config.set_daemon(true);
    }
    if args.once {
        config.set_daemon(false);
    }
    if let Some(seconds) = args.interval {
        config.set_interval(seconds);
    }
    if args.pid_file.is_some() {
        config.set_pid_file(args.pid_file.clone());
    }
    if let Some(isolation) = args.isolation {
        config.set_isolation(isolation);
    }
}
