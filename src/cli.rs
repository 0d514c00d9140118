// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2026
// - Volker Schwaberow <volker@schwaberow.de>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Isolation;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short = 'c',
        long = "config",
        help = "Configuration file (default: ~/.feedhound.yaml)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "log-level",
        help = "Override the configured log level",
        global = true
    )]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the configured feeds, once or as a daemon
    Run(RunArgs),
    /// Run exactly one isolated cycle and print its report as JSON
    #[command(hide = true)]
    Cycle,
    /// Inspect or compact the download history
    History(HistoryArgs),
    /// Validate the configuration and print a summary
    Check,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[arg(short = 'd', long = "daemon", help = "Keep polling on the configured interval")]
    pub daemon: bool,

    #[arg(
        long = "once",
        conflicts_with = "daemon",
        help = "Run a single cycle even if the configuration enables daemon mode"
    )]
    pub once: bool,

    #[arg(short = 'i', long = "interval", help = "Seconds between cycle starts")]
    pub interval: Option<u64>,

    #[arg(short = 'p', long = "pid-file")]
    pub pid_file: Option<PathBuf>,

    #[arg(long = "isolation", value_enum)]
    pub isolation: Option<Isolation>,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Print every recorded item id
    List,
    /// Tell whether a feed item link has already been processed
    Check { link: String },
    /// Sort, deduplicate and rewrite the history file
    Compact,
}
