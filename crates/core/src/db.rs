// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store for contacts.
//!
//! The [`Database`] struct owns the connection and implements
//! [`LocalStore`]. The schema is the single on-disk contract: nine
//! named columns with an integer primary key. There are no migrations;
//! [`LocalStore::reset_schema`] rebuilds the table from scratch.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::contact::{parse_timestamp_lenient, Contact, ContactFields};
use crate::error::{Error, Result};
use crate::store::LocalStore;

/// SQL schema for the contacts mirror.
///
/// `synced_ids` is internal bookkeeping: the set of contact ids that
/// have been observed in the remote table. It is what lets the
/// reconciler treat a remote deletion differently from a contact that
/// was born locally and has simply never been pushed.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY,
    first_name TEXT,
    middle_name TEXT,
    last_name TEXT,
    organization TEXT,
    mobile TEXT,
    clean_phone TEXT,
    home TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS synced_ids (
    id INTEGER PRIMARY KEY
);
"#;

/// Parse a stored timestamp, surfacing corruption as a rusqlite error.
fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    parse_timestamp_lenient(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid timestamp '{value}' in column 'updated_at'"
            ))),
        )
    })
}

/// SQLite database connection holding the local contacts table.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database at the given path, creating the table if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Fetch a single contact by id, if present.
    pub fn get(&self, id: i64) -> Result<Option<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, middle_name, last_name, organization,
                    mobile, clean_phone, home, updated_at
             FROM contacts WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_contact)?;
        match rows.next() {
            Some(contact) => Ok(Some(contact?)),
            None => Ok(None),
        }
    }

    /// Number of contacts in the table.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// Map a SELECT row (in schema column order) to a [`Contact`].
fn row_to_contact(row: &rusqlite::Row<'_>) -> std::result::Result<Contact, rusqlite::Error> {
    let updated_at: String = row.get(8)?;
    Ok(Contact {
        id: row.get(0)?,
        fields: ContactFields {
            first_name: row.get(1)?,
            middle_name: row.get(2)?,
            last_name: row.get(3)?,
            organization: row.get(4)?,
            mobile: row.get(5)?,
            clean_phone: row.get(6)?,
            home: row.get(7)?,
        },
        updated_at: parse_timestamp(&updated_at)?,
    })
}

impl LocalStore for Database {
    fn reset_schema(&mut self) -> Result<()> {
        self.conn.execute("DROP TABLE IF EXISTS contacts", [])?;
        self.conn.execute("DROP TABLE IF EXISTS synced_ids", [])?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn read_all(&mut self) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, middle_name, last_name, organization,
                    mobile, clean_phone, home, updated_at
             FROM contacts ORDER BY id",
        )?;
        let contacts = stmt
            .query_map([], row_to_contact)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn insert(&mut self, contact: &Contact) -> Result<()> {
        self.conn.execute(
            "INSERT INTO contacts (id, first_name, middle_name, last_name, organization,
                                   mobile, clean_phone, home, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                contact.id,
                contact.fields.first_name,
                contact.fields.middle_name,
                contact.fields.last_name,
                contact.fields.organization,
                contact.fields.mobile,
                contact.fields.clean_phone,
                contact.fields.home,
                contact.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update(&mut self, contact: &Contact) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE contacts SET
                first_name = ?2,
                middle_name = ?3,
                last_name = ?4,
                organization = ?5,
                mobile = ?6,
                clean_phone = ?7,
                home = ?8,
                updated_at = ?9
             WHERE id = ?1",
            params![
                contact.id,
                contact.fields.first_name,
                contact.fields.middle_name,
                contact.fields.last_name,
                contact.fields.organization,
                contact.fields.mobile,
                contact.fields.clean_phone,
                contact.fields.home,
                contact.updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::ContactNotFound(contact.id));
        }
        Ok(())
    }

    fn delete(&mut self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(Error::ContactNotFound(id));
        }
        Ok(())
    }

    fn synced_ids(&mut self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM synced_ids ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn mark_synced(&mut self, id: i64) -> Result<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO synced_ids (id) VALUES (?1)", params![id])?;
        Ok(())
    }

    fn forget_synced(&mut self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM synced_ids WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
