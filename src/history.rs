//! Paginated retrieval of the message history with one contact

use crate::error::Result;
use crate::flatten::flatten;
use crate::messenger::{Messenger, PAGE_SIZE};
use crate::model::{Contact, Dialogue, Message, User};

/// One flattened history response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub messages: Vec<Message>,
    pub users: Vec<User>,
    /// Total reported by the server for the whole dialogue.
    pub total: i32,
}

/// Fetch `PAGE_SIZE` messages starting `offset` messages back from the newest.
pub async fn fetch_page<M: Messenger>(messenger: &M, contact: &Contact, offset: i32) -> Result<Page> {
    let raw = messenger.history(contact, offset, PAGE_SIZE).await?;
    let (messages, users) = flatten(&raw);
    tracing::debug!(
        offset,
        messages = messages.len(),
        users = users.len(),
        total = raw.count,
        "Fetched history page"
    );
    Ok(Page {
        messages,
        users,
        total: raw.count,
    })
}

/// Fetch pages until the accumulated message count reaches the total declared
/// by the first response.
///
/// Every page contributes both its messages and its users; users are not
/// deduplicated. The index of each page after the first is echoed to stdout.
pub async fn collect_history<M: Messenger>(messenger: &M, contact: &Contact) -> Result<Dialogue> {
    let first = fetch_page(messenger, contact, 0).await?;
    let target = usize::try_from(first.total).unwrap_or(0);

    let mut dialogue = Dialogue {
        message_count: first.total,
        messages: first.messages,
        users: first.users,
    };

    let mut page = 1;
    while dialogue.messages.len() < target {
        let offset = PAGE_SIZE * page;
        let next = fetch_page(messenger, contact, offset).await?;

        if next.messages.is_empty() {
            tracing::warn!(
                offset,
                collected = dialogue.messages.len(),
                declared = target,
                "Server returned an empty page before the declared total, stopping"
            );
            break;
        }

        dialogue.messages.extend(next.messages);
        dialogue.users.extend(next.users);
        println!("{}", page);
        page += 1;
    }

    tracing::info!(
        pages = page,
        messages = dialogue.messages.len(),
        declared = dialogue.message_count,
        "History collected"
    );
    Ok(dialogue)
}
