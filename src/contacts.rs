//! Contact lookup by name fragment

use crate::error::Result;
use crate::messenger::Messenger;
use crate::model::Contact;

/// Case-sensitive substring match on first name, last name or username.
///
/// An empty fragment matches every contact.
pub fn matches(contact: &Contact, fragment: &str) -> bool {
    contact.first_name.contains(fragment)
        || contact.last_name.contains(fragment)
        || contact.username.contains(fragment)
}

pub fn filter_contacts(contacts: Vec<Contact>, fragment: &str) -> Vec<Contact> {
    contacts
        .into_iter()
        .filter(|c| matches(c, fragment))
        .collect()
}

/// Fetch the contact list and return every contact matching `fragment`.
pub async fn resolve<M: Messenger>(messenger: &M, fragment: &str) -> Result<Vec<Contact>> {
    let contacts = messenger.contacts().await?;
    tracing::debug!(total = contacts.len(), fragment, "Fetched contact list");

    let found = filter_contacts(contacts, fragment);
    tracing::info!(matches = found.len(), "Contacts matching \"{}\"", fragment);
    Ok(found)
}
