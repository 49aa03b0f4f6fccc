// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Contact data model shared by both stores.
//!
//! A contact is an externally assigned integer identity, seven opaque
//! text fields, and a minute-granularity `updated_at` timestamp that
//! acts as the logical clock for last-write-wins conflict resolution.
//! The reconciler copies field content verbatim and never interprets
//! it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::minute_floor;

/// Remote sheet column names, in on-sheet order.
pub const COL_ID: &str = "id";
pub const COL_FIRST_NAME: &str = "First Name";
pub const COL_MIDDLE_NAME: &str = "Middle Name";
pub const COL_LAST_NAME: &str = "Last Name";
pub const COL_ORGANIZATION: &str = "Organization";
pub const COL_MOBILE: &str = "Mobile";
pub const COL_CLEAN_PHONE: &str = "clean phone";
pub const COL_HOME: &str = "Home";
pub const COL_UPDATED_AT: &str = "updated_at";

/// The sheet header row: nine named columns, fixed order.
pub const SHEET_HEADER: [&str; 9] = [
    COL_ID,
    COL_FIRST_NAME,
    COL_MIDDLE_NAME,
    COL_LAST_NAME,
    COL_ORGANIZATION,
    COL_MOBILE,
    COL_CLEAN_PHONE,
    COL_HOME,
    COL_UPDATED_AT,
];

/// Timestamp format used in sheet cells (minute precision).
pub const CELL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// The named text attributes of a contact.
///
/// All fields are opaque to the sync: they are copied between stores
/// without inspection. Absent cells map to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
    pub mobile: Option<String>,
    pub clean_phone: Option<String>,
    pub home: Option<String>,
}

impl ContactFields {
    /// The fields paired with their sheet column names, in sheet order.
    ///
    /// Absent fields surface as empty strings so a push clears the cell
    /// rather than leaving stale content.
    pub fn cells(&self) -> [(&'static str, &str); 7] {
        [
            (COL_FIRST_NAME, self.first_name.as_deref().unwrap_or("")),
            (COL_MIDDLE_NAME, self.middle_name.as_deref().unwrap_or("")),
            (COL_LAST_NAME, self.last_name.as_deref().unwrap_or("")),
            (COL_ORGANIZATION, self.organization.as_deref().unwrap_or("")),
            (COL_MOBILE, self.mobile.as_deref().unwrap_or("")),
            (COL_CLEAN_PHONE, self.clean_phone.as_deref().unwrap_or("")),
            (COL_HOME, self.home.as_deref().unwrap_or("")),
        ]
    }
}

/// A contact as held in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Stable identity assigned outside the sync. Never mutated here.
    pub id: i64,
    #[serde(flatten)]
    pub fields: ContactFields,
    /// Logical clock for conflict resolution, minute precision.
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// The full row values for appending to the sheet, in header order.
    pub fn sheet_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(SHEET_HEADER.len());
        row.push(self.id.to_string());
        for (_, value) in self.fields.cells() {
            row.push(value.to_string());
        }
        row.push(format_cell_timestamp(self.updated_at));
        row
    }
}

/// One data row of the remote sheet, as read.
///
/// The id is kept raw because human-edited rows may carry anything;
/// the reconciler decides what to do with rows that do not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRow {
    /// Raw content of the id cell.
    pub id: String,
    pub fields: ContactFields,
    /// `None` when the cell was empty or unparsable (not an error).
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteRow {
    /// Coerce the raw id cell to the integer matching key.
    ///
    /// Returns `None` for malformed ids; such rows are excluded from
    /// every partition of the sync.
    pub fn parse_id(&self) -> Option<i64> {
        self.id.trim().parse::<i64>().ok()
    }
}

/// Format a timestamp for a sheet cell (minute precision).
pub fn format_cell_timestamp(ts: DateTime<Utc>) -> String {
    minute_floor(ts).format(CELL_TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp leniently, as humans and exporters write them.
///
/// Accepts RFC3339 plus the common `T`- and space-separated shapes with
/// or without seconds. Returns `None` instead of an error: an
/// unreadable timestamp means "treat as freshly authored".
pub fn parse_timestamp_lenient(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

#[cfg(test)]
#[path = "contact_tests.rs"]
mod tests;
