//! Telegram Contact History Backup Library
//!
//! This library provides tools to:
//! - Sign in to Telegram once and reuse the stored session afterwards
//! - Find a contact by a fragment of their name or username
//! - Page through the complete message history with that contact
//! - Flatten the server responses and export them to a JSON document

pub mod config;
pub mod contacts;
pub mod error;
pub mod export;
pub mod flatten;
pub mod history;
pub mod messenger;
pub mod model;
pub mod session;
pub mod telegram;

// Re-export common types
pub use config::{Config, ConfigOverrides};
pub use error::{Error, Fatal, Result};
pub use messenger::{Messenger, PAGE_SIZE};
pub use model::{Contact, Dialogue, Message, User};
pub use session::{bootstrap, Authenticator, SessionLock};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
