// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rolors - library behind the `rolo` contact sync CLI.
//!
//! `rolo` mirrors a Google Sheets contact list into a local SQLite
//! table and pushes local changes back, resolving conflicts
//! last-write-wins on the per-contact `updated_at` timestamp.
//!
//! # Main Components
//!
//! - [`Config`] - TOML configuration with env overrides
//! - [`sheets::SheetsClient`] - the remote store adapter
//! - [`rolo_core::Reconciler`] - the sync algorithm itself
//! - [`Error`] - error types for all operations

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod sheets;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{Error, Result};

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Sync { rebuild } => commands::sync::run(&config, rebuild),
        Command::Init => commands::init::run(&config),
        Command::Show => commands::show::run(&config),
    }
}
