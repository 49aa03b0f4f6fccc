// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rolo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep a Google Sheets contact list and a local SQLite mirror in sync")]
#[command(
    long_about = "Keep a Google Sheets contact list and a local SQLite mirror in sync.\n\n\
    One pass pulls sheet changes into the local table, then pushes local-only\n\
    changes back. Conflicts resolve last-write-wins on the updated_at column;\n\
    the sheet is authoritative for deletions."
)]
pub struct Cli {
    /// Config file path (default: ~/.config/rolo/config.toml)
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one reconciliation pass (pull from the sheet, then push back)
    Sync {
        /// Drop and recreate the local table before syncing
        #[arg(long)]
        rebuild: bool,
    },
    /// Create or reset the local contacts database
    Init,
    /// Print the local contacts table
    Show,
}
