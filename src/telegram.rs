//! Raw Telegram API calls behind the [`Messenger`] trait
//!
//! TL responses are unwrapped here into crate-owned raw types; nothing past
//! this module sees a TL enum.

use grammers_client::Client;
use grammers_tl_types as tl;

use crate::error::Result;
use crate::messenger::Messenger;
use crate::model::{Contact, RawMessage, RawPage, RawUser};

/// [`Messenger`] backed by an authenticated grammers client.
pub struct TelegramMessenger<'a> {
    client: &'a Client,
}

impl<'a> TelegramMessenger<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }
}

impl Messenger for TelegramMessenger<'_> {
    async fn contacts(&self) -> Result<Vec<Contact>> {
        let response = self
            .client
            .invoke(&tl::functions::contacts::GetContacts { hash: 0 })
            .await?;

        match response {
            tl::enums::contacts::Contacts::Contacts(c) => {
                Ok(c.users.iter().filter_map(contact_from_user).collect())
            }
            tl::enums::contacts::Contacts::NotModified => {
                tracing::warn!("Contact list reported as not modified");
                Ok(Vec::new())
            }
        }
    }

    async fn history(&self, contact: &Contact, offset: i32, limit: i32) -> Result<RawPage> {
        let request = tl::functions::messages::GetHistory {
            peer: input_peer(contact),
            offset_id: 0,
            offset_date: 0,
            add_offset: offset,
            limit,
            max_id: 0,
            min_id: 0,
            hash: 0,
        };
        let response = self.client.invoke(&request).await?;
        Ok(page_from_messages(response))
    }
}

fn input_peer(contact: &Contact) -> tl::enums::InputPeer {
    tl::enums::InputPeer::User(tl::types::InputPeerUser {
        user_id: contact.id,
        access_hash: contact.access_hash,
    })
}

fn contact_from_full(u: &tl::types::User) -> Contact {
    Contact {
        id: u.id,
        access_hash: u.access_hash.unwrap_or(0),
        first_name: u.first_name.clone().unwrap_or_default(),
        last_name: u.last_name.clone().unwrap_or_default(),
        username: u.username.clone().unwrap_or_default(),
        phone: u.phone.clone().unwrap_or_default(),
    }
}

/// Contact entry for a full user; empty users carry nothing to match on.
fn contact_from_user(user: &tl::enums::User) -> Option<Contact> {
    match user {
        tl::enums::User::User(u) => Some(contact_from_full(u)),
        tl::enums::User::Empty(_) => None,
    }
}

fn raw_user(user: &tl::enums::User) -> RawUser {
    match user {
        tl::enums::User::User(u) => RawUser::User(contact_from_full(u)),
        tl::enums::User::Empty(u) => RawUser::Empty { id: u.id },
    }
}

/// Numeric id of any peer.
pub fn peer_id(peer: &tl::enums::Peer) -> i64 {
    match peer {
        tl::enums::Peer::User(p) => p.user_id,
        tl::enums::Peer::Chat(p) => p.chat_id,
        tl::enums::Peer::Channel(p) => p.channel_id,
    }
}

/// Sender of a message: `from_id` when present, otherwise the dialogue peer
/// (incoming private messages omit `from_id`).
pub fn sender_id(from_id: Option<&tl::enums::Peer>, peer: &tl::enums::Peer) -> i64 {
    from_id.map_or_else(|| peer_id(peer), peer_id)
}

fn raw_message(message: tl::enums::Message) -> RawMessage {
    match message {
        tl::enums::Message::Message(m) => RawMessage::Text {
            id: m.id,
            from_id: Some(sender_id(m.from_id.as_ref(), &m.peer_id)),
            date: m.date,
            text: m.message,
        },
        tl::enums::Message::Service(m) => RawMessage::Service { id: m.id },
        tl::enums::Message::Empty(m) => RawMessage::Empty { id: m.id },
    }
}

/// Unwrap any history response variant.
///
/// A plain `messages.messages` answer means the whole history fit in one
/// response, so its length is the total.
fn page_from_messages(response: tl::enums::messages::Messages) -> RawPage {
    let (count, messages, users) = match response {
        tl::enums::messages::Messages::Messages(m) => {
            let count = i32::try_from(m.messages.len()).unwrap_or(i32::MAX);
            (count, m.messages, m.users)
        }
        tl::enums::messages::Messages::Slice(m) => (m.count, m.messages, m.users),
        tl::enums::messages::Messages::ChannelMessages(m) => (m.count, m.messages, m.users),
        tl::enums::messages::Messages::NotModified(m) => (m.count, Vec::new(), Vec::new()),
    };

    RawPage {
        count,
        messages: messages.into_iter().map(raw_message).collect(),
        users: users.iter().map(raw_user).collect(),
    }
}
