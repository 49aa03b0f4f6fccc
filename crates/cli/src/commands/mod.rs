// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations for the `rolo` CLI.

pub mod init;
pub mod show;
pub mod sync;

use rolo_core::Database;

use crate::config::Config;
use crate::error::Result;

/// Open the configured local database, creating it if needed.
pub(crate) fn open_db(config: &Config) -> Result<Database> {
    Ok(Database::open(&config.db_path)?)
}
