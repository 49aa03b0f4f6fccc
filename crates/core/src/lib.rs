// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rolo-core: Shared library for the rolo contact sync tool.
//!
//! This crate provides the contact data model, the store contracts for
//! the two sides of the sync (a spreadsheet-like remote table and a
//! local SQLite table), the SQLite implementation of the local side,
//! and the reconciler that brings both stores into agreement.

pub mod clock;
pub mod contact;
pub mod db;
pub mod error;
pub mod reconcile;
pub mod store;

pub use clock::{minute_floor, Clock, SystemClock};
pub use contact::{Contact, ContactFields, RemoteRow};
pub use db::Database;
pub use error::{Error, Result};
pub use reconcile::{PassSummary, Reconciler};
pub use store::{CellWrite, LocalStore, RemoteStore};
