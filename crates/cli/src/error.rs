// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// All possible errors that can occur in the rolors library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config file not found: {}\n  hint: pass --config or create ~/.config/rolo/config.toml", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("credentials error: {0}\n  hint: the credentials file must hold a bearer token (raw or as JSON access_token)")]
    Credentials(String),

    #[error(transparent)]
    Core(#[from] rolo_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for rolors operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
