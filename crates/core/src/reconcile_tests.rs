// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::contact::{
    parse_timestamp_lenient, ContactFields, COL_CLEAN_PHONE, COL_FIRST_NAME, COL_HOME,
    COL_LAST_NAME, COL_MIDDLE_NAME, COL_MOBILE, COL_ORGANIZATION,
};
use crate::db::Database;
use crate::error::Error;
use chrono::{DateTime, Utc};

/// Fixed clock for deterministic stamping.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// In-memory remote that applies writes to its rows and records them.
#[derive(Default)]
struct MemoryRemote {
    rows: Vec<RemoteRow>,
    appended: Vec<Contact>,
    cell_writes: Vec<CellWrite>,
    fail_writes: bool,
}

fn opt(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl MemoryRemote {
    fn apply(&mut self, write: &CellWrite) {
        let row = &mut self.rows[write.row];
        match write.column.as_str() {
            crate::contact::COL_ID => row.id = write.value.clone(),
            COL_FIRST_NAME => row.fields.first_name = opt(&write.value),
            COL_MIDDLE_NAME => row.fields.middle_name = opt(&write.value),
            COL_LAST_NAME => row.fields.last_name = opt(&write.value),
            COL_ORGANIZATION => row.fields.organization = opt(&write.value),
            COL_MOBILE => row.fields.mobile = opt(&write.value),
            COL_CLEAN_PHONE => row.fields.clean_phone = opt(&write.value),
            COL_HOME => row.fields.home = opt(&write.value),
            COL_UPDATED_AT => row.updated_at = parse_timestamp_lenient(&write.value),
            _ => unreachable!("unknown column {}", write.column),
        }
    }
}

impl RemoteStore for MemoryRemote {
    fn read_all(&mut self) -> crate::Result<Vec<RemoteRow>> {
        Ok(self.rows.clone())
    }

    fn append_row(&mut self, contact: &Contact) -> crate::Result<()> {
        if self.fail_writes {
            return Err(Error::Remote("append refused".to_string()));
        }
        self.appended.push(contact.clone());
        self.rows.push(RemoteRow {
            id: contact.id.to_string(),
            fields: contact.fields.clone(),
            updated_at: Some(minute_floor(contact.updated_at)),
        });
        Ok(())
    }

    fn write_cell(&mut self, row: usize, column: &str, value: &str) -> crate::Result<()> {
        self.batch_write_cells(&[CellWrite::new(row, column, value)])
    }

    fn batch_write_cells(&mut self, writes: &[CellWrite]) -> crate::Result<()> {
        if self.fail_writes {
            return Err(Error::Remote("write refused".to_string()));
        }
        for write in writes {
            self.apply(write);
            self.cell_writes.push(write.clone());
        }
        Ok(())
    }
}

fn ts(value: &str) -> DateTime<Utc> {
    parse_timestamp_lenient(value).unwrap()
}

fn fields(first_name: &str) -> ContactFields {
    ContactFields {
        first_name: opt(first_name),
        ..Default::default()
    }
}

fn remote_row(id: &str, first_name: &str, updated_at: Option<&str>) -> RemoteRow {
    RemoteRow {
        id: id.to_string(),
        fields: fields(first_name),
        updated_at: updated_at.map(ts),
    }
}

fn contact(id: i64, first_name: &str, updated_at: &str) -> Contact {
    Contact {
        id,
        fields: fields(first_name),
        updated_at: ts(updated_at),
    }
}

fn run(remote: &mut MemoryRemote, local: &mut Database, now: &str) -> PassSummary {
    let clock = FixedClock(ts(now));
    Reconciler::new(remote, local, &clock).run_pass().unwrap()
}

const NOW: &str = "2024-05-01T12:00:30Z";
const NOW_STAMP: &str = "2024-05-01T12:00";

// ── pull: remote → local ────────────────────────────────────────────

#[test]
fn remote_only_contact_is_inserted_with_remote_timestamp() {
    // Scenario: remote has {id:1, Ana, 2024-01-01T10:00}; local empty.
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Ana", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.inserted_local, 1);
    assert_eq!(summary.stamped, 1);
    let pulled = local.get(1).unwrap().unwrap();
    assert_eq!(pulled.fields.first_name.as_deref(), Some("Ana"));
    assert_eq!(pulled.updated_at, ts("2024-01-01T10:00"));

    // the remote timestamp cell now shows the pass execution time
    assert_eq!(
        remote.cell_writes,
        vec![CellWrite::new(0, COL_UPDATED_AT, NOW_STAMP)]
    );
    assert_eq!(remote.rows[0].updated_at, Some(ts(NOW_STAMP)));
}

#[test]
fn missing_remote_timestamp_defaults_to_now() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("4", "Drew", None));
    let mut local = Database::open_in_memory().unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.inserted_local, 1);
    let pulled = local.get(4).unwrap().unwrap();
    assert_eq!(pulled.updated_at, ts(NOW_STAMP));
    // the unreadable cell is stamped too
    assert_eq!(summary.stamped, 1);
}

#[test]
fn newer_remote_overwrites_local() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Annette", Some("2024-03-01T08:00")));
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(1, "Ana", "2024-01-01T10:00")).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.updated_local, 1);
    assert_eq!(summary.stamped, 1);
    let updated = local.get(1).unwrap().unwrap();
    assert_eq!(updated.fields.first_name.as_deref(), Some("Annette"));
    assert_eq!(updated.updated_at, ts("2024-03-01T08:00"));
}

#[test]
fn older_remote_is_skipped() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Stale", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(1, "Fresh", "2024-03-01T08:00")).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.updated_local, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(local.get(1).unwrap().unwrap().fields.first_name.as_deref(), Some("Fresh"));
}

#[test]
fn equal_timestamps_touch_neither_side() {
    // Scenario: both stores have id 3, different names, equal timestamps.
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("3", "RemoteName", Some("2024-02-02T09:30")));
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(3, "LocalName", "2024-02-02T09:30")).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.skipped, 1);
    assert!(summary.is_converged());
    assert_eq!(local.get(3).unwrap().unwrap().fields.first_name.as_deref(), Some("LocalName"));
    assert_eq!(remote.rows[0].fields.first_name.as_deref(), Some("RemoteName"));
    assert!(remote.cell_writes.is_empty());
}

#[test]
fn malformed_remote_id_is_skipped() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("not-a-number", "Ghost", Some("2024-01-01T10:00")));
    remote.rows.push(remote_row("2", "Bo", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    // the malformed row is excluded from every partition, not an error
    assert_eq!(summary.inserted_local, 1);
    assert_eq!(local.count().unwrap(), 1);
    assert!(local.get(2).unwrap().is_some());
}

// ── deletions ───────────────────────────────────────────────────────

#[test]
fn contact_removed_from_remote_is_deleted_locally() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Ana", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(5, "Gone", "2024-01-01T10:00")).unwrap();
    local.mark_synced(5).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.deleted_local, 1);
    assert!(local.get(5).unwrap().is_none());
    // the deletion is never mirrored to the remote
    assert!(remote.appended.is_empty());
    assert_eq!(remote.rows.len(), 1);
    assert!(local.synced_ids().unwrap().contains(&1));
    assert!(!local.synced_ids().unwrap().contains(&5));
}

#[test]
fn locally_born_contact_is_pushed_not_deleted() {
    // Scenario: local has {id:2, Bo, 2024-02-01T09:00}; remote lacks id 2.
    let mut remote = MemoryRemote::default();
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(2, "Bo", "2024-02-01T09:00")).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.deleted_local, 0);
    assert_eq!(summary.appended_remote, 1);
    assert_eq!(remote.appended.len(), 1);
    let row = remote.appended[0].sheet_row();
    assert_eq!(row[0], "2");
    assert_eq!(row[1], "Bo");
    assert_eq!(row[8], "2024-02-01T09:00");
    // now tracked, so a later remote deletion propagates
    assert!(local.synced_ids().unwrap().contains(&2));
}

#[test]
fn pushed_contact_is_deleted_once_remote_drops_it() {
    let mut remote = MemoryRemote::default();
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(2, "Bo", "2024-02-01T09:00")).unwrap();

    run(&mut remote, &mut local, NOW);
    assert_eq!(remote.rows.len(), 1);

    // a human deletes the row from the sheet between passes
    remote.rows.clear();
    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.deleted_local, 1);
    assert_eq!(summary.appended_remote, 0);
    assert_eq!(local.count().unwrap(), 0);
}

// ── push: local → remote ────────────────────────────────────────────

#[test]
fn newer_local_overwrites_remote_cells_in_header_order() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Old", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();
    let mut newer = contact(1, "New", "2024-03-01T08:00");
    newer.fields.organization = Some("Acme".to_string());
    local.insert(&newer).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.updated_remote, 1);
    let columns: Vec<&str> = remote.cell_writes.iter().map(|w| w.column.as_str()).collect();
    assert_eq!(
        columns,
        vec![
            COL_FIRST_NAME,
            COL_MIDDLE_NAME,
            COL_LAST_NAME,
            COL_ORGANIZATION,
            COL_MOBILE,
            COL_CLEAN_PHONE,
            COL_HOME,
            COL_UPDATED_AT,
        ]
    );
    assert!(remote.cell_writes.iter().all(|w| w.row == 0));
    assert_eq!(remote.rows[0].fields.first_name.as_deref(), Some("New"));
    assert_eq!(remote.rows[0].fields.organization.as_deref(), Some("Acme"));
    assert_eq!(remote.rows[0].updated_at, Some(ts("2024-03-01T08:00")));
}

#[test]
fn push_skips_rows_without_readable_timestamp_when_local_not_newer() {
    // pull substitutes "now" and stamps; by the time push compares, the
    // local copy matches the stamp, so nothing is pushed back
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("6", "NoClock", None));
    let mut local = Database::open_in_memory().unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.inserted_local, 1);
    assert_eq!(summary.updated_remote, 0);
    assert_eq!(summary.appended_remote, 0);
}

// ── stamping and failure tolerance ──────────────────────────────────

#[test]
fn stamp_is_at_least_the_write_moment() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Ana", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();

    run(&mut remote, &mut local, NOW);

    let stamp = remote.rows[0].updated_at.unwrap();
    assert_eq!(stamp, minute_floor(ts(NOW)));
    assert!(stamp >= minute_floor(local.get(1).unwrap().unwrap().updated_at));
}

#[test]
fn stamp_failure_keeps_local_write_and_pass_alive() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Ana", Some("2024-01-01T10:00")));
    remote.rows.push(remote_row("2", "Bo", Some("2024-01-01T10:00")));
    remote.fail_writes = true;
    let mut local = Database::open_in_memory().unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    // both inserts committed despite every stamp failing
    assert_eq!(summary.inserted_local, 2);
    assert_eq!(summary.stamp_failures, 2);
    assert_eq!(summary.stamped, 0);
    assert_eq!(local.count().unwrap(), 2);
}

#[test]
fn push_cell_failure_is_logged_and_pass_continues() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Old", Some("2024-01-01T10:00")));
    remote.fail_writes = true;
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(1, "New", "2024-03-01T08:00")).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert_eq!(summary.updated_remote, 0);
    // the remote still holds the old version; healed on a later pass
    assert_eq!(remote.rows[0].fields.first_name.as_deref(), Some("Old"));
}

// ── convergence ─────────────────────────────────────────────────────

#[test]
fn converged_stores_produce_no_writes() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Ana", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(1, "Ana", "2024-01-01T10:00")).unwrap();
    local.mark_synced(1).unwrap();

    let summary = run(&mut remote, &mut local, NOW);

    assert!(summary.is_converged());
    assert!(remote.cell_writes.is_empty());
    assert!(remote.appended.is_empty());
}

#[test]
fn seconds_in_local_timestamp_do_not_repush_forever() {
    // the local timestamp is opaque text from an external writer and
    // may carry seconds; the sheet cell only ever holds a floored value
    let mut remote = MemoryRemote::default();
    let mut local = Database::open_in_memory().unwrap();
    local.insert(&contact(2, "Bo", "2024-02-01T09:00:30")).unwrap();

    let first = run(&mut remote, &mut local, NOW);
    assert_eq!(first.appended_remote, 1);
    assert_eq!(remote.rows[0].updated_at, Some(ts("2024-02-01T09:00")));

    // at minute precision both sides agree, so nothing is re-pushed
    let second = run(&mut remote, &mut local, NOW);
    assert_eq!(second.updated_remote, 0);
    assert!(second.is_converged());
}

#[test]
fn repeated_passes_reach_a_fixpoint() {
    let mut remote = MemoryRemote::default();
    remote.rows.push(remote_row("1", "Ana", Some("2024-01-01T10:00")));
    let mut local = Database::open_in_memory().unwrap();

    // pass 1: pull the contact and stamp the sheet
    let first = run(&mut remote, &mut local, NOW);
    assert_eq!(first.write_count(), 2);

    // pass 2: the stamp is newer than the pulled copy, so the local
    // timestamp catches up; the cell already holds the stamp value
    let second = run(&mut remote, &mut local, NOW);
    assert_eq!(second.updated_local, 1);
    assert_eq!(second.stamped, 0);

    // pass 3: nothing left to do
    let third = run(&mut remote, &mut local, NOW);
    assert!(third.is_converged());

    // convergence invariant: fields and timestamps agree
    let mirrored = local.get(1).unwrap().unwrap();
    assert_eq!(remote.rows[0].fields, mirrored.fields);
    assert_eq!(remote.rows[0].updated_at, Some(mirrored.updated_at));
}
