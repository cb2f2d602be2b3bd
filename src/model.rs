//! Data model for contacts, messages and the exported dialogue
//!
//! `Contact` and the `Raw*` types come from the messaging collaborator and are
//! read-only here. `Message`, `User` and `Dialogue` form the export schema.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact as returned by the contact list RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub access_hash: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone: String,
}

impl Contact {
    /// Human readable name, falling back to `@username` and then the id.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.username.is_empty() {
            format!("@{}", self.username)
        } else {
            self.id.to_string()
        }
    }
}

/// One exported message.
///
/// `Message::default()` is the placeholder written for entries that were not
/// regular messages: zero id, sender and timestamp, empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i32,
    pub from: i64,
    pub ts: i64,
    pub msg: String,
}

impl Message {
    pub fn is_placeholder(&self) -> bool {
        *self == Message::default()
    }
}

/// A user referenced by a page of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone: String,
}

impl From<&Contact> for User {
    fn from(contact: &Contact) -> Self {
        Self {
            user_id: contact.id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            username: contact.username.clone(),
            phone: contact.phone.clone(),
        }
    }
}

/// Export root.
///
/// `users` is accumulated page by page and is not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub message_count: i32,
    pub messages: Vec<Message>,
    pub users: Vec<User>,
}

impl Dialogue {
    /// Number of distinct non-zero sender ids.
    pub fn distinct_senders(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.from != 0)
            .map(|m| m.from)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Oldest and newest timestamps, ignoring placeholders.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut stamps = self.messages.iter().filter(|m| m.ts > 0).map(|m| m.ts);
        let first = stamps.next()?;
        let (oldest, newest) = stamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
        Some((
            DateTime::from_timestamp(oldest, 0)?,
            DateTime::from_timestamp(newest, 0)?,
        ))
    }
}

/// A message entry as it arrives from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMessage {
    Text {
        id: i32,
        from_id: Option<i64>,
        date: i32,
        text: String,
    },
    /// Service notice (joins, calls, pins, ...).
    Service { id: i32 },
    Empty { id: i32 },
}

/// A user entry as it arrives from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawUser {
    User(Contact),
    Empty { id: i64 },
}

/// One history response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// Server-reported total number of messages in the dialogue.
    pub count: i32,
    pub messages: Vec<RawMessage>,
    pub users: Vec<RawUser>,
}
