// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rolo-core operations.

use thiserror::Error;

/// All possible errors that can occur in rolo-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("contact not found: {0}")]
    ContactNotFound(i64),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for rolo-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
