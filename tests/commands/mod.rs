//! Command-level tests and the in-memory messenger they share

mod test_backup;
mod test_cli;

use std::cell::RefCell;

use telegram_backup::error::{Error, Result};
use telegram_backup::model::{RawMessage, RawPage, RawUser};
use telegram_backup::{Contact, Messenger};

/// Contact book plus a dialogue of `total` text messages, served newest first.
pub struct FakeMessenger {
    pub contacts: Vec<Contact>,
    pub total: i32,
    /// Offsets at which a service entry replaces the regular message.
    pub service_at: Vec<i32>,
    pub fail_contacts: bool,
    pub history_calls: RefCell<Vec<i32>>,
}

impl FakeMessenger {
    pub fn new(contacts: Vec<Contact>, total: i32) -> Self {
        Self {
            contacts,
            total,
            service_at: Vec::new(),
            fail_contacts: false,
            history_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn offsets(&self) -> Vec<i32> {
        self.history_calls.borrow().clone()
    }
}

impl Messenger for FakeMessenger {
    async fn contacts(&self) -> Result<Vec<Contact>> {
        if self.fail_contacts {
            return Err(Error::TelegramError("AUTH_KEY_UNREGISTERED".into()));
        }
        Ok(self.contacts.clone())
    }

    async fn history(&self, contact: &Contact, offset: i32, limit: i32) -> Result<RawPage> {
        self.history_calls.borrow_mut().push(offset);

        let newest = self.total - offset;
        let count = newest.clamp(0, limit);
        let messages = (0..count)
            .map(|i| {
                let id = newest - i;
                if self.service_at.contains(&(offset + i)) {
                    RawMessage::Service { id }
                } else {
                    RawMessage::Text {
                        id,
                        from_id: Some(if id % 2 == 0 { contact.id } else { 1 }),
                        date: 1_700_000_000 + id,
                        text: format!("message {}", id),
                    }
                }
            })
            .collect();

        Ok(RawPage {
            count: self.total,
            messages,
            users: vec![RawUser::User(contact.clone()), RawUser::Empty { id: 1 }],
        })
    }
}

pub fn negar() -> Contact {
    Contact {
        id: 5001,
        access_hash: 77,
        first_name: "Negar".into(),
        last_name: "Karimi".into(),
        username: "negar_k".into(),
        phone: "15550001".into(),
    }
}

pub fn bob() -> Contact {
    Contact {
        id: 5002,
        access_hash: 78,
        first_name: "Bob".into(),
        last_name: "Stone".into(),
        username: "bobby".into(),
        phone: String::new(),
    }
}
