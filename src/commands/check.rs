// File: check.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025-2026
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use colored::*;
use std::path::Path;

use super::{load_config, print_info, print_success, print_warning};
use crate::config::Config;
use crate::feed::FeedSource;

/// Validates the configuration without touching the filesystem and prints
/// what a run would use.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = load_config(config_path, None)?;
    config.validate()?;

    print_success(&format!("{} is valid", config_path.display()));
    print_summary(&config);

    for problem in problems(&config) {
        print_warning(&problem);
    }
    Ok(())
}

fn print_summary(config: &Config) {
    print_info(&format!("{} feeds", config.feeds().len()));
    for feed in config.feeds() {
        let source = FeedSource::parse(feed);
        let kind = match source {
            FeedSource::Url(_) => "url",
            FeedSource::File(_) => "file",
            FeedSource::Inline(_) => "inline",
        };
        println!("  {:<7} {}", kind.cyan(), source);
    }

    println!("  {:<14} {}", "downloads".bold(), config.download_path().display());
    println!("  {:<14} {}", "history".bold(), config.history_file().display());
    println!("  {:<14} {}", "log".bold(), config.log_file().display());
    if config.daemon() {
        println!(
            "  {:<14} every {}s, {:?} isolation, pid file {}",
            "daemon".bold(),
            config.interval().as_secs(),
            config.isolation(),
            config
                .pid_file()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
    } else {
        println!("  {:<14} single cycle", "mode".bold());
    }
}

/// Conditions that would make `run` fail at startup.
fn problems(config: &Config) -> Vec<String> {
    let mut problems = Vec::new();
    if !config.download_path().is_dir() {
        problems.push(format!(
            "download_path {} is not a directory",
            config.download_path().display()
        ));
    }
    for (name, path) in [
        ("history_file", config.history_file()),
        ("log_file", config.log_file()),
    ] {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            problems.push(format!(
                "{} directory {} does not exist",
                name,
                parent.display()
            ));
        }
    }
    if let Some(pid_file) = config.pid_file() {
        if pid_file.exists() {
            problems.push(format!(
                "PID marker {} exists, another instance may be running",
                pid_file.display()
            ));
        }
    }
    problems
}
