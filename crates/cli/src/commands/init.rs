// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rolo_core::LocalStore;

use crate::config::Config;
use crate::error::Result;

use super::open_db;

/// Create or reset the local contacts database.
pub fn run(config: &Config) -> Result<()> {
    let mut db = open_db(config)?;
    db.reset_schema()?;
    println!("Initialized contacts database at {}", config.db_path.display());
    Ok(())
}
