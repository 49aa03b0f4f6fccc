// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Two-pass last-write-wins reconciliation between the stores.
//!
//! One [`Reconciler::run_pass`] takes a single remote snapshot, pulls
//! remote changes into the local table, then pushes local-only changes
//! back against that same snapshot. Pull runs first so that anything it
//! writes locally compares equal to the snapshot in the push and is not
//! redundantly written back.
//!
//! The remote store is authoritative for deletions: ids missing from
//! the snapshot are removed locally, and nothing here ever deletes a
//! remote row. Each row-level store call commits independently, so a
//! crash mid-pass leaves a partially reconciled but uncorrupted state
//! and re-running the pass is the recovery mechanism.

use std::collections::{HashMap, HashSet};

use crate::clock::{minute_floor, Clock};
use crate::contact::{format_cell_timestamp, Contact, RemoteRow, COL_UPDATED_AT};
use crate::error::Result;
use crate::store::{CellWrite, LocalStore, RemoteStore};

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Remote-only contacts inserted into the local table.
    pub inserted_local: usize,
    /// Local contacts overwritten by a strictly newer remote version.
    pub updated_local: usize,
    /// Local contacts deleted because their id left the remote table.
    pub deleted_local: usize,
    /// Common contacts left untouched (remote older or equal).
    pub skipped: usize,
    /// Local-only contacts appended to the remote table.
    pub appended_remote: usize,
    /// Remote contacts overwritten by a strictly newer local version.
    pub updated_remote: usize,
    /// Timestamp cells stamped after a remote-sourced local write.
    pub stamped: usize,
    /// Stamp writes that failed (best effort, healed next pass).
    pub stamp_failures: usize,
}

impl PassSummary {
    /// Total writes issued against either store.
    pub fn write_count(&self) -> usize {
        self.inserted_local
            + self.updated_local
            + self.deleted_local
            + self.appended_remote
            + self.updated_remote
            + self.stamped
    }

    /// True when the pass found nothing to do.
    pub fn is_converged(&self) -> bool {
        self.write_count() == 0
    }
}

/// Reconciles a remote spreadsheet-like store with a local table.
///
/// Store handles and the clock are injected so the reconciler can be
/// driven against in-memory fakes in tests.
pub struct Reconciler<'a, R: RemoteStore, L: LocalStore> {
    remote: &'a mut R,
    local: &'a mut L,
    clock: &'a dyn Clock,
}

impl<'a, R: RemoteStore, L: LocalStore> Reconciler<'a, R, L> {
    pub fn new(remote: &'a mut R, local: &'a mut L, clock: &'a dyn Clock) -> Self {
        Reconciler { remote, local, clock }
    }

    /// Run one full reconciliation pass: pull, then push.
    ///
    /// A failure to read either store or to mutate the local table is
    /// fatal and aborts the pass; targeted remote cell writes are best
    /// effort and only logged.
    pub fn run_pass(&mut self) -> Result<PassSummary> {
        let snapshot = self.remote.read_all()?;
        let mut summary = PassSummary::default();
        self.pull(&snapshot, &mut summary)?;
        self.push(&snapshot, &mut summary)?;
        tracing::info!(
            pulled = summary.inserted_local + summary.updated_local,
            deleted = summary.deleted_local,
            pushed = summary.appended_remote + summary.updated_remote,
            skipped = summary.skipped,
            "reconciliation pass complete"
        );
        Ok(summary)
    }

    /// Remote → local: insert, update, and delete to mirror the snapshot.
    fn pull(&mut self, snapshot: &[RemoteRow], summary: &mut PassSummary) -> Result<()> {
        let local = self.local.read_all()?;
        let local_by_id: HashMap<i64, &Contact> = local.iter().map(|c| (c.id, c)).collect();
        let synced: HashSet<i64> = self.local.synced_ids()?.into_iter().collect();
        let mut remote_ids: HashSet<i64> = HashSet::with_capacity(snapshot.len());

        for (row, remote) in snapshot.iter().enumerate() {
            let Some(id) = remote.parse_id() else {
                tracing::warn!(raw_id = %remote.id, row, "skipping remote row with malformed id");
                continue;
            };
            remote_ids.insert(id);

            // An unreadable remote timestamp means freshly authored.
            let updated_at = match remote.updated_at {
                Some(ts) => minute_floor(ts),
                None => minute_floor(self.clock.now()),
            };

            match local_by_id.get(&id) {
                None => {
                    let contact = Contact { id, fields: remote.fields.clone(), updated_at };
                    self.local.insert(&contact)?;
                    summary.inserted_local += 1;
                    tracing::info!(id, "inserted local contact from remote");
                    self.stamp(row, id, remote, summary);
                }
                Some(existing) => {
                    if updated_at > existing.updated_at {
                        let contact = Contact { id, fields: remote.fields.clone(), updated_at };
                        self.local.update(&contact)?;
                        summary.updated_local += 1;
                        tracing::info!(id, "updated local contact from remote");
                        self.stamp(row, id, remote, summary);
                    } else {
                        // Equal timestamps favor no update.
                        summary.skipped += 1;
                        tracing::debug!(id, "skipped - local copy up to date");
                    }
                }
            }
        }

        // The remote table is the deletion authority, but only for ids
        // it has actually held: a contact born locally that has never
        // round-tripped is left for the push to append.
        for contact in &local {
            if remote_ids.contains(&contact.id) {
                continue;
            }
            if synced.contains(&contact.id) {
                self.local.delete(contact.id)?;
                self.local.forget_synced(contact.id)?;
                summary.deleted_local += 1;
                tracing::info!(id = contact.id, "deleted local contact absent from remote");
            } else {
                tracing::debug!(id = contact.id, "local-only contact awaiting push");
            }
        }

        for id in &remote_ids {
            self.local.mark_synced(*id)?;
        }

        Ok(())
    }

    /// Stamp a remote row's timestamp cell with the current minute.
    ///
    /// Issued after every remote-sourced local write so the sheet shows
    /// when the row was last synced, and so the push against the same
    /// snapshot does not mirror the change straight back. Best effort:
    /// the local write stays committed if this fails. Skipped when the
    /// cell already holds the stamp value, which is what lets repeated
    /// passes reach a fixpoint instead of re-stamping forever.
    fn stamp(&mut self, row: usize, id: i64, remote: &RemoteRow, summary: &mut PassSummary) {
        let stamp = minute_floor(self.clock.now());
        if remote.updated_at.map(minute_floor) == Some(stamp) {
            return;
        }
        let write = CellWrite::new(row, COL_UPDATED_AT, format_cell_timestamp(stamp));
        match self.remote.batch_write_cells(std::slice::from_ref(&write)) {
            Ok(()) => {
                summary.stamped += 1;
                tracing::debug!(id, stamp = %write.value, "stamped remote updated_at");
            }
            Err(e) => {
                summary.stamp_failures += 1;
                tracing::warn!(id, error = %e, "failed to stamp remote updated_at");
            }
        }
    }

    /// Local → remote: append new rows, overwrite strictly older ones.
    ///
    /// The local table is re-read because the pull may have changed it;
    /// the comparison still runs against the original snapshot. This
    /// direction never deletes remote rows.
    fn push(&mut self, snapshot: &[RemoteRow], summary: &mut PassSummary) -> Result<()> {
        let local = self.local.read_all()?;
        let mut remote_by_id: HashMap<i64, (usize, &RemoteRow)> = HashMap::new();
        for (row, remote) in snapshot.iter().enumerate() {
            if let Some(id) = remote.parse_id() {
                remote_by_id.insert(id, (row, remote));
            }
        }

        for contact in &local {
            match remote_by_id.get(&contact.id) {
                None => {
                    self.remote.append_row(contact)?;
                    self.local.mark_synced(contact.id)?;
                    summary.appended_remote += 1;
                    tracing::info!(id = contact.id, "appended contact to remote");
                }
                Some(&(row, remote)) => {
                    // Both sides compare at minute precision: the cell only
                    // ever holds a floored value, so a seconds-bearing local
                    // timestamp must not count as newer. A row with no
                    // readable timestamp is left for the next pass.
                    let newer = match remote.updated_at {
                        Some(ts) => minute_floor(contact.updated_at) > minute_floor(ts),
                        None => false,
                    };
                    if newer {
                        match self.push_row(row, contact) {
                            Ok(()) => {
                                summary.updated_remote += 1;
                                tracing::info!(id = contact.id, "updated remote contact from local");
                            }
                            Err(e) => {
                                tracing::warn!(
                                    id = contact.id,
                                    error = %e,
                                    "remote cell update failed, continuing"
                                );
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Overwrite one remote row cell by cell, timestamp last.
    fn push_row(&mut self, row: usize, contact: &Contact) -> Result<()> {
        for (column, value) in contact.fields.cells() {
            self.remote.write_cell(row, column, value)?;
        }
        self.remote
            .write_cell(row, COL_UPDATED_AT, &format_cell_timestamp(contact.updated_at))
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
