//! Flattening of history responses into the export schema
//!
//! Output index `i` always corresponds to input index `i`. Entries that are
//! not regular messages keep their slot as a zero-valued placeholder so that
//! the exported sequence stays aligned with the server response.

use crate::model::{Message, RawMessage, RawPage, RawUser, User};

/// Map one raw message entry. Non-message variants yield the placeholder.
pub fn flatten_message(raw: &RawMessage) -> Message {
    match raw {
        RawMessage::Text {
            id,
            from_id,
            date,
            text,
        } => Message {
            id: *id,
            from: from_id.unwrap_or(0),
            ts: i64::from(*date),
            msg: text.clone(),
        },
        RawMessage::Service { id } | RawMessage::Empty { id } => {
            tracing::debug!(message_id = id, "Non-text entry kept as placeholder");
            Message::default()
        }
    }
}

pub fn flatten_user(raw: &RawUser) -> User {
    match raw {
        RawUser::User(contact) => User::from(contact),
        RawUser::Empty { id } => User {
            user_id: *id,
            ..Default::default()
        },
    }
}

pub fn flatten_messages(raw: &[RawMessage]) -> Vec<Message> {
    raw.iter().map(flatten_message).collect()
}

pub fn flatten_users(raw: &[RawUser]) -> Vec<User> {
    raw.iter().map(flatten_user).collect()
}

/// Split a page into its flat message and user lists.
pub fn flatten(page: &RawPage) -> (Vec<Message>, Vec<User>) {
    (flatten_messages(&page.messages), flatten_users(&page.users))
}
