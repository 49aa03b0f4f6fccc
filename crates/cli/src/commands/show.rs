// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rolo_core::{Contact, LocalStore};

use crate::config::Config;
use crate::error::Result;

use super::open_db;

/// Print the local contacts table.
pub fn run(config: &Config) -> Result<()> {
    let mut db = open_db(config)?;
    let contacts = db.read_all()?;
    for contact in &contacts {
        println!("{}", format_contact(contact));
    }
    println!("{} contacts", contacts.len());
    Ok(())
}

/// One display line per contact: id, name, phone, last update.
fn format_contact(contact: &Contact) -> String {
    let name = [
        contact.fields.first_name.as_deref(),
        contact.fields.middle_name.as_deref(),
        contact.fields.last_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");
    format!(
        "{:>6}  {:<30} {:<16} {}",
        contact.id,
        name,
        contact.fields.mobile.as_deref().unwrap_or("-"),
        contact.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
