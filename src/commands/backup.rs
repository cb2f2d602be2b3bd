//! Back up the full history with one contact
//!
//! Session bootstrap, contact lookup, paginated history fetch, JSON export.
//! Any failure ends the run; nothing is written unless every page arrived.

use std::fs;

use crate::config::Config;
use crate::contacts;
use crate::error::{Error, Fatal};
use crate::export;
use crate::history;
use crate::messenger::Messenger;
use crate::model::{Contact, Dialogue};
use crate::session::{bootstrap, SessionLock};
use crate::telegram::TelegramMessenger;

/// Run a backup against the live service.
pub async fn run(config: &Config) -> Result<Dialogue, Fatal> {
    // Checked before touching the network or the session.
    let contact_name = config
        .contact_name
        .clone()
        .ok_or_else(|| Error::ContactNotFound(String::new()))?;

    if let Some(parent) = config.credentials_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(Error::from)?;
        }
    }

    let _lock = SessionLock::acquire(config.lock_path())?;
    let client = bootstrap(config).await?;
    let messenger = TelegramMessenger::new(&client);

    run_with(&messenger, &contact_name, config).await
}

/// Resolve `contact_name`, collect its history and export it.
pub async fn run_with<M: Messenger>(
    messenger: &M,
    contact_name: &str,
    config: &Config,
) -> Result<Dialogue, Fatal> {
    let found = contacts::resolve(messenger, contact_name).await?;
    let contact = pick_contact(found, contact_name)?;
    tracing::info!(
        contact = %contact.display_name(),
        id = contact.id,
        "Backing up history"
    );

    let dialogue = history::collect_history(messenger, &contact).await?;
    export::export(&dialogue, &config.output_path, config.pretty)?;
    Ok(dialogue)
}

/// First match wins; the others are listed so a longer fragment can be used.
fn pick_contact(found: Vec<Contact>, contact_name: &str) -> crate::error::Result<Contact> {
    let mut found = found.into_iter();
    let first = found
        .next()
        .ok_or_else(|| Error::ContactNotFound(contact_name.to_string()))?;

    let others: Vec<String> = found.map(|c| c.display_name()).collect();
    if !others.is_empty() {
        tracing::warn!(
            chosen = %first.display_name(),
            "\"{}\" also matches: {}",
            contact_name,
            others.join(", ")
        );
    }
    Ok(first)
}
