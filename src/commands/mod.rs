// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2026
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::Config;
use crate::errors::ConfigError;
use crate::logging;
use crate::pipeline::CycleReport;

pub mod check;
pub mod cycle;
pub mod history;
pub mod run;

/// Resolves the configuration file and hands off to the selected command.
/// No subcommand means `run` with its defaults.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config)?;
    let log_level = cli.log_level;

    match cli.command {
        None => run::execute(&RunArgs::default(), &config_path, log_level.as_deref()).await,
        Some(Commands::Run(args)) => run::execute(&args, &config_path, log_level.as_deref()).await,
        Some(Commands::Cycle) => cycle::execute(&config_path, log_level.as_deref()).await,
        Some(Commands::History(args)) => {
            logging::init_console_logging(log_level.as_deref().unwrap_or("warn"))?;
            history::execute(&args, &config_path).await
        }
        Some(Commands::Check) => {
            logging::init_console_logging(log_level.as_deref().unwrap_or("warn"))?;
            check::execute(&config_path).await
        }
    }
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path),
        None => Config::default_path(),
    }
}

fn load_config(config_path: &Path, log_level: Option<&str>) -> Result<Config> {
    let mut config = Config::load(config_path)?;
    if let Some(level) = log_level {
        config.set_log_level(level);
    }
    Ok(config)
}

fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

fn print_report(report: &CycleReport) {
    print_success(&format!(
        "Cycle finished in {}: {} new, {} already seen, {} items in {} feeds",
        format_duration(report.duration_ms().max(0) as u64),
        report.stored,
        report.already_seen,
        report.items_seen,
        report.feeds_processed
    ));
    if report.feeds_failed > 0 {
        print_warning(&format!("{} feeds could not be loaded", report.feeds_failed));
    }
    let failures = report.fetch_failures + report.store_failures;
    if failures > 0 {
        print_warning(&format!("{} downloads failed and will be retried", failures));
    }
    if report.collisions > 0 {
        print_warning(&format!(
            "{} downloads matched an existing file and were not written",
            report.collisions
        ));
    }
}

fn format_duration(ms: u64) -> String {
    if ms >= 60000 {
        format!("{}m {:.1}s", ms / 60000, (ms % 60000) as f64 / 1000.0)
    } else if ms >= 1000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{}ms", ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0ms")]
    #[case(999, "999ms")]
    #[case(1500, "1.50s")]
    #[case(90_000, "1m 30.0s")]
    fn test_format_duration(#[case] ms: u64, #[case] expected: &str) {
        assert_eq!(format_duration(ms), expected);
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/etc/feedhound.yaml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/feedhound.yaml"));
    }

    #[test]
    fn test_log_level_override() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "feeds: []\ndownload_path: /x\nhistory_file: /y\nlog_file: /z\nlog_level: warn\n",
        )
        .unwrap();

        assert_eq!(load_config(&path, None).unwrap().log_level(), "warn");
        assert_eq!(load_config(&path, Some("trace")).unwrap().log_level(), "trace");
    }
}
