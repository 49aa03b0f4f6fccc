// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Google Sheets adapter implementing the remote store contract.
//!
//! Talks to the Sheets v4 values API with a blocking HTTP client and a
//! bearer token taken from `GOOGLE_SHEETS_TOKEN` or the configured
//! credentials file. Reads map cells to columns through the worksheet's
//! own header row, so a reordered sheet still syncs correctly; writes
//! address single cells in A1 notation. Data row i lives at physical
//! row i+2 (1-based rows plus the header).

use std::fs;
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use rolo_core::contact::{
    parse_timestamp_lenient, ContactFields, COL_CLEAN_PHONE, COL_FIRST_NAME, COL_HOME, COL_ID,
    COL_LAST_NAME, COL_MIDDLE_NAME, COL_MOBILE, COL_ORGANIZATION, COL_UPDATED_AT, SHEET_HEADER,
};
use rolo_core::error::{Error as CoreError, Result as CoreResult};
use rolo_core::{CellWrite, Contact, RemoteRow, RemoteStore};

use crate::config::SheetConfig;
use crate::error::{Error, Result};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Env var holding a bearer token, overriding the credentials file.
const TOKEN_ENV: &str = "GOOGLE_SHEETS_TOKEN";

/// Pause after each batched write, to stay under the API write quota.
const WRITE_PAUSE: Duration = Duration::from_millis(700);

/// Blocking client for one spreadsheet worksheet.
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    worksheet: String,
    token: String,
    /// Column layout from the last read; the canonical header until then.
    header: Vec<String>,
}

impl SheetsClient {
    /// Build a client for the configured worksheet.
    ///
    /// Fails fast on unreadable credentials; the first API call reports
    /// connectivity problems.
    pub fn new(sheet: &SheetConfig) -> Result<Self> {
        let token = load_token(sheet)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;
        Ok(SheetsClient {
            http,
            base_url: format!("{API_BASE}/{}", sheet.spreadsheet_id),
            worksheet: sheet.worksheet.clone(),
            token,
            header: SHEET_HEADER.iter().map(|c| c.to_string()).collect(),
        })
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|c| c == column)
    }

    fn check(resp: reqwest::blocking::Response) -> CoreResult<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(CoreError::Remote(format!("sheets API {status}: {body}")));
        }
        resp.json::<Value>()
            .map_err(|e| CoreError::Remote(format!("invalid sheets response: {e}")))
    }

    fn get(&self, url: &str) -> CoreResult<Value> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| CoreError::Remote(e.to_string()))?;
        Self::check(resp)
    }

    fn post(&self, url: &str, body: &Value) -> CoreResult<()> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| CoreError::Remote(e.to_string()))?;
        Self::check(resp).map(|_| ())
    }

    fn put(&self, url: &str, body: &Value) -> CoreResult<()> {
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| CoreError::Remote(e.to_string()))?;
        Self::check(resp).map(|_| ())
    }
}

impl RemoteStore for SheetsClient {
    fn read_all(&mut self) -> CoreResult<Vec<RemoteRow>> {
        let url = format!("{}/values/{}", self.base_url, encode_range(&self.worksheet));
        let response = self.get(&url)?;
        let values: Vec<Vec<Value>> = match response.get("values") {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Vec::new(), // an empty worksheet has no values key
        };
        let (header, rows) = parse_rows(&values);
        if let Some(header) = header {
            self.header = header;
        }
        Ok(rows)
    }

    fn append_row(&mut self, contact: &Contact) -> CoreResult<()> {
        let url = format!(
            "{}/values/{}:append?valueInputOption=RAW",
            self.base_url,
            encode_range(&self.worksheet)
        );
        let body = json!({ "values": [contact.sheet_row()] });
        self.post(&url, &body)
    }

    fn write_cell(&mut self, row: usize, column: &str, value: &str) -> CoreResult<()> {
        let col = self
            .column_index(column)
            .ok_or_else(|| CoreError::Remote(format!("worksheet has no column '{column}'")))?;
        let range = a1_range(&self.worksheet, row, col);
        let url = format!(
            "{}/values/{}?valueInputOption=RAW",
            self.base_url,
            encode_range(&range)
        );
        let body = json!({ "range": range, "values": [[value]] });
        self.put(&url, &body)
    }

    fn batch_write_cells(&mut self, writes: &[CellWrite]) -> CoreResult<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let mut data = Vec::with_capacity(writes.len());
        for write in writes {
            let col = self.column_index(&write.column).ok_or_else(|| {
                CoreError::Remote(format!("worksheet has no column '{}'", write.column))
            })?;
            data.push(json!({
                "range": a1_range(&self.worksheet, write.row, col),
                "values": [[write.value]],
            }));
        }
        let url = format!("{}/values:batchUpdate", self.base_url);
        let body = json!({ "valueInputOption": "RAW", "data": data });
        self.post(&url, &body)?;
        thread::sleep(WRITE_PAUSE);
        Ok(())
    }
}

/// Resolve the bearer token: env var first, then the credentials file.
fn load_token(sheet: &SheetConfig) -> Result<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        let token = token.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
    let content = fs::read_to_string(&sheet.credentials).map_err(|e| {
        Error::Credentials(format!("cannot read {}: {e}", sheet.credentials.display()))
    })?;
    token_from_credentials(&content).ok_or_else(|| {
        Error::Credentials(format!("no token found in {}", sheet.credentials.display()))
    })
}

/// Extract a bearer token from credential file content.
///
/// Accepts a JSON object with an `access_token` (or `token`) member, a
/// JSON string, or the raw token on its own.
fn token_from_credentials(content: &str) -> Option<String> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map
            .get("access_token")
            .or_else(|| map.get("token"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Ok(Value::String(token)) => Some(token),
        _ => {
            let token = content.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
    }
}

/// Render a cell value as text the way the sheet displays it.
fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Assign one cell to its field by column name. Unknown columns are
/// ignored so extra sheet columns do not break the sync.
fn set_field(fields: &mut ContactFields, column: &str, value: String) {
    let value = (!value.is_empty()).then_some(value);
    match column {
        COL_FIRST_NAME => fields.first_name = value,
        COL_MIDDLE_NAME => fields.middle_name = value,
        COL_LAST_NAME => fields.last_name = value,
        COL_ORGANIZATION => fields.organization = value,
        COL_MOBILE => fields.mobile = value,
        COL_CLEAN_PHONE => fields.clean_phone = value,
        COL_HOME => fields.home = value,
        _ => {}
    }
}

/// Split raw sheet values into the header row and data rows.
///
/// Cells are mapped to fields through the header, so column order in
/// the sheet does not matter. Returns `None` for the header when the
/// sheet is completely empty.
fn parse_rows(values: &[Vec<Value>]) -> (Option<Vec<String>>, Vec<RemoteRow>) {
    let Some((first, data)) = values.split_first() else {
        return (None, Vec::new());
    };
    let header: Vec<String> = first.iter().map(cell_to_string).collect();

    let mut rows = Vec::with_capacity(data.len());
    for raw in data {
        let mut row = RemoteRow {
            id: String::new(),
            fields: ContactFields::default(),
            updated_at: None,
        };
        for (i, cell) in raw.iter().enumerate() {
            let Some(column) = header.get(i) else { break };
            let value = cell_to_string(cell);
            match column.as_str() {
                COL_ID => row.id = value,
                COL_UPDATED_AT => row.updated_at = parse_timestamp_lenient(&value),
                other => set_field(&mut row.fields, other, value),
            }
        }
        rows.push(row);
    }
    (Some(header), rows)
}

/// Spreadsheet column letter for a 0-based index (0 → A, 26 → AA).
fn col_letter(index: usize) -> String {
    let mut letters = String::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters
}

/// A1 range for a 0-based data row and column index.
fn a1_range(worksheet: &str, row: usize, col: usize) -> String {
    format!("{}!{}{}", worksheet, col_letter(col), row + 2)
}

/// Escape a range for use in a URL path segment.
///
/// Worksheet names are free text, so everything that would terminate
/// the path or start a query is percent-encoded. Non-ASCII characters
/// pass through; the URL parser encodes those.
fn encode_range(range: &str) -> String {
    let mut out = String::with_capacity(range.len());
    for c in range.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '&' => out.push_str("%26"),
            '+' => out.push_str("%2B"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "sheets_tests.rs"]
mod tests;
