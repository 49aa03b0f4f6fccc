// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store contracts for the two sides of the sync.
//!
//! The reconciler only sees these traits. The remote side is a
//! spreadsheet-like table addressed by data row position and column
//! name; the local side is a relational table keyed by id. Concrete
//! adapters live in [`crate::db`] (SQLite) and in the CLI crate
//! (Google Sheets).

use crate::contact::{Contact, RemoteRow};
use crate::error::Result;

/// A single cell write, addressed by 0-based data row and column name.
///
/// Adapters translate the data position to physical coordinates (the
/// sheet adds 2: one for 1-based rows, one for the header row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl CellWrite {
    pub fn new(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        CellWrite { row, column: column.into(), value: value.into() }
    }
}

/// The remote spreadsheet-like store.
///
/// Human-editable source of truth for inserts and deletions. Reads are
/// full-table snapshots in sheet order; writes are targeted at cells
/// or appended rows. Rows are never deleted through this contract.
pub trait RemoteStore {
    /// Read every data row, in sheet order (header excluded).
    fn read_all(&mut self) -> Result<Vec<RemoteRow>>;

    /// Append a full row for a contact after the last data row.
    fn append_row(&mut self, contact: &Contact) -> Result<()>;

    /// Overwrite a single cell.
    fn write_cell(&mut self, row: usize, column: &str, value: &str) -> Result<()>;

    /// Overwrite several cells in one round trip.
    fn batch_write_cells(&mut self, writes: &[CellWrite]) -> Result<()>;
}

/// The local relational store, a synchronized mirror of the remote.
///
/// Besides the contacts table itself, the store keeps a provenance set
/// of ids known to have existed in the remote table. The reconciler
/// uses it to tell a remote deletion (mirror it locally) apart from a
/// locally born contact (push it to the remote).
pub trait LocalStore {
    /// Drop and recreate the contacts table and the provenance set.
    fn reset_schema(&mut self) -> Result<()>;

    /// Read every contact.
    fn read_all(&mut self) -> Result<Vec<Contact>>;

    /// Insert a contact. The id must not already exist.
    fn insert(&mut self, contact: &Contact) -> Result<()>;

    /// Overwrite all fields and the timestamp of an existing contact.
    fn update(&mut self, contact: &Contact) -> Result<()>;

    /// Delete a contact by id. Deleting an absent id is an error.
    fn delete(&mut self, id: i64) -> Result<()>;

    /// Ids that have been observed in the remote table at some point.
    fn synced_ids(&mut self) -> Result<Vec<i64>>;

    /// Record that an id now exists in the remote table. Idempotent.
    fn mark_synced(&mut self, id: i64) -> Result<()>;

    /// Drop an id from the provenance set. Absent ids are ignored.
    fn forget_synced(&mut self, id: i64) -> Result<()>;
}
