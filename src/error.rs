//! Error types for the Telegram backup tool

use std::fmt;
use std::panic::Location;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Session file not found: {0}")]
    SessionNotFound(String),

    #[error("Session is locked by another process")]
    SessionLocked,

    #[error("Failed to acquire session lock: {0}")]
    LockError(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("No contact named \"{0}\" found")]
    ContactNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Stored session {0} is not authorized; delete it to sign in again")]
    AuthorizationRequired(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        Error::TelegramError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

/// Process exit status for every handled failure.
pub const FATAL_EXIT_CODE: u8 = 2;

/// An error that ends the run, tagged with the place it surfaced.
///
/// Conversion from [`Error`] is `#[track_caller]`, so a `?` inside a function
/// returning `Result<_, Fatal>` records the file and line of that `?`.
#[derive(Debug)]
pub struct Fatal {
    location: &'static Location<'static>,
    error: Error,
}

impl Fatal {
    #[track_caller]
    pub fn new(error: Error) -> Self {
        Self {
            location: Location::caller(),
            error,
        }
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn exit_code(&self) -> u8 {
        FATAL_EXIT_CODE
    }
}

impl From<Error> for Fatal {
    #[track_caller]
    fn from(error: Error) -> Self {
        Fatal::new(error)
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}",
            self.location.file(),
            self.location.line(),
            self.error
        )
    }
}

impl std::error::Error for Fatal {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
