//! The RPC surface consumed from the messaging client

use crate::error::Result;
use crate::model::{Contact, RawPage};

/// Messages requested per history call.
pub const PAGE_SIZE: i32 = 100;

/// Authenticated access to the two RPCs the backup needs.
///
/// Implemented by [`crate::telegram::TelegramMessenger`] for the real service
/// and by in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait Messenger {
    /// Full contact list, returned in one response.
    async fn contacts(&self) -> Result<Vec<Contact>>;

    /// Up to `limit` messages exchanged with `contact`, newest first, skipping
    /// the `offset` most recent ones.
    async fn history(&self, contact: &Contact, offset: i32, limit: i32) -> Result<RawPage>;
}
