// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2026
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::new_without_default)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod feed;
pub mod fetcher;
pub mod identifier;
pub mod ledger;
pub mod logging;
pub mod pidfile;
pub mod pipeline;
pub mod store;
pub mod supervisor;
