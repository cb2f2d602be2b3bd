//! Configuration for the backup run
//!
//! Values come from, highest priority first: command-line flags (which also
//! read their environment variables), `config.yml`, and built-in defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "config.yml";
pub const CREDENTIALS_FILE: &str = "credentials.session";
pub const OUTPUT_FILE: &str = "dialogue.json";
pub const DEFAULT_SERVER_PORT: u16 = 443;

/// Pause between requesting a login code and prompting for it.
pub const CODE_PROMPT_DELAY: Duration = Duration::from_secs(1);

/// Address of the messaging server used for the first sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self {
            ip: String::new(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ip.is_empty() {
            write!(f, "<session default>:{}", self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    telegram: Option<TelegramConfig>,
    backup: Option<BackupConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    api_id: Option<String>,
    api_hash: Option<String>,
    phone: Option<String>,
    server_ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    server_port: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BackupConfig {
    contact_name: Option<String>,
    credentials: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: Option<bool>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Replace a `${VAR}` value with the variable's content; other values pass through.
fn resolve_placeholder(value: Option<String>) -> Option<String> {
    let v = value?;
    match v.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).ok(),
        None => Some(v),
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, field: &str) -> Result<Option<T>> {
    match resolve_placeholder(value) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::ConfigError(format!("{} must be a number, got \"{}\"", field, v))),
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub phone_number: Option<String>,
    pub server_ip: Option<String>,
    pub server_port: Option<u16>,
    pub contact_name: Option<String>,
    pub credentials: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pretty: bool,
}

/// Fully resolved configuration, passed explicitly to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_id: i32,
    pub api_hash: String,
    pub phone_number: String,
    pub server: ServerEndpoint,
    /// Name fragment to search for. `None` when neither flag nor file set it.
    pub contact_name: Option<String>,
    pub credentials_path: PathBuf,
    pub output_path: PathBuf,
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
            phone_number: String::new(),
            server: ServerEndpoint::default(),
            contact_name: None,
            credentials_path: PathBuf::from(CREDENTIALS_FILE),
            output_path: PathBuf::from(OUTPUT_FILE),
            pretty: false,
        }
    }
}

impl Config {
    /// Resolve configuration from an optional file and command-line overrides.
    ///
    /// An explicitly named file must exist; the default `config.yml` is
    /// optional.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };
        Ok(base.apply(overrides))
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded configuration file");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let yaml: Option<YamlConfig> = serde_yaml::from_str(content)?;
        let yaml = yaml.unwrap_or_default();
        let telegram = yaml.telegram.unwrap_or_default();
        let backup = yaml.backup.unwrap_or_default();
        let defaults = Self::default();

        Ok(Self {
            api_id: parse_number(telegram.api_id, "telegram.api_id")?.unwrap_or(defaults.api_id),
            api_hash: resolve_placeholder(telegram.api_hash).unwrap_or_default(),
            phone_number: resolve_placeholder(telegram.phone).unwrap_or_default(),
            server: ServerEndpoint {
                ip: resolve_placeholder(telegram.server_ip).unwrap_or_default(),
                port: parse_number(telegram.server_port, "telegram.server_port")?
                    .unwrap_or(DEFAULT_SERVER_PORT),
            },
            contact_name: resolve_placeholder(backup.contact_name),
            credentials_path: backup.credentials.unwrap_or(defaults.credentials_path),
            output_path: backup.output.unwrap_or(defaults.output_path),
            pretty: backup.pretty.unwrap_or(false),
        })
    }

    /// Overlay command-line values on top of this configuration.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.api_id {
            self.api_id = v;
        }
        if let Some(v) = overrides.api_hash {
            self.api_hash = v;
        }
        if let Some(v) = overrides.phone_number {
            self.phone_number = v;
        }
        if let Some(v) = overrides.server_ip {
            self.server.ip = v;
        }
        if let Some(v) = overrides.server_port {
            self.server.port = v;
        }
        if overrides.contact_name.is_some() {
            self.contact_name = overrides.contact_name;
        }
        if let Some(v) = overrides.credentials {
            self.credentials_path = v;
        }
        if let Some(v) = overrides.output {
            self.output_path = v;
        }
        self.pretty |= overrides.pretty;
        self
    }

    /// Lock file guarding the credentials artifact.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.credentials_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}
