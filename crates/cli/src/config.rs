// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync configuration.
//!
//! Configuration lives in a TOML file, by default
//! `~/.config/rolo/config.toml`, and names the local database path and
//! the remote worksheet. The environment variables `DB_PATH`,
//! `GOOGLE_SHEET_ID`, `WORKSHEET_NAME` and `GOOGLE_SHEETS_TOKEN`
//! override individual values, mirroring the dotenv setup this tool
//! replaced. Credential material stays opaque: it is a file path (or
//! env var) handed to the sheets adapter, never parsed here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "rolo";
const CONFIG_FILE_NAME: &str = "config.toml";

fn default_db_path() -> PathBuf {
    PathBuf::from("contacts.db")
}

fn default_worksheet() -> String {
    "Sheet1".to_string()
}

fn default_credentials() -> PathBuf {
    PathBuf::from("credentials.json")
}

/// Remote worksheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet identifier from the document URL.
    pub spreadsheet_id: String,
    /// Worksheet (tab) name within the spreadsheet.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    /// Path to the file holding the API bearer token.
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,
}

/// Tool configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the local SQLite database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// The remote side of the sync.
    pub sheet: SheetConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// Environment overrides are applied after parsing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        if !path.exists() {
            return Err(Error::ConfigNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Apply the environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(db_path) = std::env::var("DB_PATH") {
            self.db_path = PathBuf::from(db_path);
        }
        if let Ok(id) = std::env::var("GOOGLE_SHEET_ID") {
            self.sheet.spreadsheet_id = id;
        }
        if let Ok(worksheet) = std::env::var("WORKSHEET_NAME") {
            self.sheet.worksheet = worksheet;
        }
    }
}

/// The default config file location: `~/.config/rolo/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?;
    Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
