//! Session management for the Telegram client
//!
//! Provides:
//! - File-based locking of the credentials artifact
//! - The choice between stored and interactive authentication
//! - Client creation and the first-time sign-in flow

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::client::updates::UpdatesLike;
use grammers_client::types::LoginToken;
use grammers_client::Client;
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::mpsc;

use crate::config::{Config, CODE_PROMPT_DELAY};
use crate::error::{Error, Result};

/// Lock guard giving this process exclusive use of the credentials artifact.
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock at `path`.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                lock_file: Some(lock_file),
            }),
            Err(_) => {
                tracing::error!(
                    lock = %path.display(),
                    "Session is already in use by another process; wait for it to finish"
                );
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(ref file) = self.lock_file {
            let _ = file.unlock();
        }
        if self.lock_file.take().is_some() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// How the session will be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// The credentials artifact exists and is reused.
    Stored,
    /// No artifact: sign in with a code sent to the phone.
    Interactive,
}

/// Presence of the credentials artifact is the only deciding factor.
pub fn auth_mode(credentials: &Path) -> AuthMode {
    if credentials.exists() {
        AuthMode::Stored
    } else {
        AuthMode::Interactive
    }
}

/// Open (or create) the SQLite session at `path`.
pub fn open_session(path: &Path) -> Result<Arc<SqliteSession>> {
    let session = SqliteSession::open(path).map_err(|e| {
        Error::SessionNotFound(format!("Failed to open session {}: {}", path.display(), e))
    })?;
    Ok(Arc::new(session))
}

/// Prompt on `output` and read one verification code from `input`.
pub fn read_code<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "Enter code: ")?;
    output.flush()?;

    let mut code = String::new();
    input.read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::InvalidArgument("empty verification code".to_string()));
    }
    Ok(code.to_string())
}

/// Sign-in operations of the messaging service.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    /// Handle tying a requested code to the following sign-in.
    type Token;

    async fn authorized(&self) -> Result<bool>;

    async fn request_code(&self, phone: &str, api_hash: &str) -> Result<Self::Token>;

    /// Complete sign-in and return the display name of the account.
    async fn submit_code(&self, token: &Self::Token, code: &str) -> Result<String>;
}

/// Holder for SenderPool components and Client
pub struct TelegramClient {
    pub client: Client,
    _handle: SenderPoolHandle,
    _updates: mpsc::UnboundedReceiver<UpdatesLike>,
    _runner_handle: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Create a new TelegramClient from session
    pub async fn connect(session: Arc<SqliteSession>, api_id: i32) -> Result<Self> {
        let pool = SenderPool::new(session, api_id);

        // Create client from pool (need reference to whole pool)
        let client = Client::new(&pool);

        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        // The network runner is the only task spawned; RPCs are awaited one at a time.
        let runner_handle = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            _handle: handle,
            _updates: updates,
            _runner_handle: runner_handle,
        })
    }
}

// Implement Deref to allow using TelegramClient as &Client
impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Authenticator for TelegramClient {
    type Token = LoginToken;

    async fn authorized(&self) -> Result<bool> {
        Ok(self.client.is_authorized().await?)
    }

    async fn request_code(&self, phone: &str, api_hash: &str) -> Result<LoginToken> {
        self.client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| Error::SignInFailed(format!("Failed to request code: {}", e)))
    }

    async fn submit_code(&self, token: &LoginToken, code: &str) -> Result<String> {
        let user = self
            .client
            .sign_in(token, code)
            .await
            .map_err(|e| Error::SignInFailed(e.to_string()))?;
        Ok(user.full_name())
    }
}

/// Where a first sign-in keeps its session until the code is accepted.
///
/// An interrupted sign-in leaves only this file, so the next run still
/// takes the interactive branch.
pub fn pending_path(credentials: &Path) -> PathBuf {
    let mut name = credentials.as_os_str().to_owned();
    name.push(".pending");
    PathBuf::from(name)
}

/// Produce an authenticated client, signing in interactively when no
/// credentials artifact exists yet.
pub async fn bootstrap(config: &Config) -> Result<TelegramClient> {
    let credentials = config.credentials_path.as_path();

    match auth_mode(credentials) {
        AuthMode::Stored => {
            tracing::info!(credentials = %credentials.display(), "Loading stored session");
            let client = TelegramClient::connect(open_session(credentials)?, config.api_id).await?;
            ensure_authorized(&client, credentials).await?;
            Ok(client)
        }
        AuthMode::Interactive => {
            tracing::info!(
                phone = %config.phone_number,
                server = %config.server,
                "No stored session, starting sign-in"
            );
            let pending = pending_path(credentials);
            // Left over from an interrupted sign-in.
            let _ = fs::remove_file(&pending);
            let client = TelegramClient::connect(open_session(&pending)?, config.api_id).await?;
            sign_in_and_store(&client, config, &pending, read_code_from_stdin).await?;
            Ok(client)
        }
    }
}

/// Fail when a stored session no longer grants access.
pub async fn ensure_authorized<A: Authenticator>(auth: &A, credentials: &Path) -> Result<()> {
    if auth.authorized().await? {
        Ok(())
    } else {
        Err(Error::AuthorizationRequired(credentials.display().to_string()))
    }
}

/// Run the code sign-in against the session at `pending`, then move it to the
/// credentials path. A failed sign-in removes the pending session.
pub async fn sign_in_and_store<A, F>(
    auth: &A,
    config: &Config,
    pending: &Path,
    read: F,
) -> Result<()>
where
    A: Authenticator,
    F: FnOnce() -> Result<String> + Send + 'static,
{
    if let Err(err) = sign_in(auth, config, read).await {
        let _ = fs::remove_file(pending);
        return Err(err);
    }

    // The open session keeps writing to the same file after the rename.
    fs::rename(pending, &config.credentials_path)?;
    tracing::info!(credentials = %config.credentials_path.display(), "Session stored");
    Ok(())
}

async fn sign_in<A, F>(auth: &A, config: &Config, read: F) -> Result<()>
where
    A: Authenticator,
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let token = auth.request_code(&config.phone_number, &config.api_hash).await?;

    // Give the code time to arrive before prompting.
    tokio::time::sleep(CODE_PROMPT_DELAY).await;

    // Read on the blocking pool; the runtime thread also drives the sender runner.
    let code = tokio::task::spawn_blocking(read)
        .await
        .map_err(io::Error::other)??;

    let user = auth.submit_code(&token, &code).await?;
    tracing::info!(user = %user, "Signed in");
    Ok(())
}

fn read_code_from_stdin() -> Result<String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    read_code(&mut input, &mut io::stdout())
}
