// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rolo_core::{LocalStore, PassSummary, Reconciler, SystemClock};

use crate::config::Config;
use crate::error::Result;
use crate::sheets::SheetsClient;

use super::open_db;

/// Run one full reconciliation pass against the configured stores.
pub fn run(config: &Config, rebuild: bool) -> Result<()> {
    let mut db = open_db(config)?;
    if rebuild {
        db.reset_schema()?;
        tracing::info!("local table rebuilt");
    }
    let mut sheets = SheetsClient::new(&config.sheet)?;
    let clock = SystemClock;

    let summary = Reconciler::new(&mut sheets, &mut db, &clock).run_pass()?;
    println!("{}", report(&summary));
    if summary.stamp_failures > 0 {
        eprintln!(
            "warning: {} timestamp stamp(s) failed and will be retried next pass",
            summary.stamp_failures
        );
    }
    Ok(())
}

/// One-line human summary of a pass.
fn report(summary: &PassSummary) -> String {
    if summary.is_converged() {
        return "up to date".to_string();
    }
    format!(
        "pulled {} ({} new, {} updated), deleted {}, pushed {} ({} new, {} updated), {} up to date",
        summary.inserted_local + summary.updated_local,
        summary.inserted_local,
        summary.updated_local,
        summary.deleted_local,
        summary.appended_remote + summary.updated_remote,
        summary.appended_remote,
        summary.updated_remote,
        summary.skipped,
    )
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
