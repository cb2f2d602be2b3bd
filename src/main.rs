//! Telegram Backup CLI - main entry point
//!
//! Exports the full message history with one contact to a JSON file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use telegram_backup::{commands, Config, ConfigOverrides, Fatal};

#[derive(Parser)]
#[command(name = "telegram_backup")]
#[command(about = "Back up the message history with one Telegram contact", long_about = None)]
#[command(version)]
struct Cli {
    /// API ID from Telegram
    #[arg(long = "api_id", alias = "api-id", env = "TELEGRAM_API_ID")]
    api_id: Option<i32>,

    /// API hash from Telegram
    #[arg(long = "api_hash", alias = "api-hash", env = "TELEGRAM_API_HASH")]
    api_hash: Option<String>,

    /// Your account phone number
    #[arg(long = "phone_number", alias = "phone-number", env = "TELEGRAM_PHONE")]
    phone_number: Option<String>,

    /// Telegram server IP
    #[arg(long = "server_ip", alias = "server-ip", env = "TELEGRAM_SERVER_IP")]
    server_ip: Option<String>,

    /// Telegram server port [default: 443]
    #[arg(long = "server_port", alias = "server-port", env = "TELEGRAM_SERVER_PORT")]
    server_port: Option<u16>,

    /// Name of the contact to back up (substring of first name, last name or username)
    #[arg(long = "contact_name", alias = "contact-name")]
    contact_name: Option<String>,

    /// Configuration file (defaults to ./config.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stored session file
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            phone_number: self.phone_number.clone(),
            server_ip: self.server_ip.clone(),
            server_port: self.server_port,
            contact_name: self.contact_name.clone(),
            credentials: self.credentials.clone(),
            output: self.output.clone(),
            pretty: self.pretty,
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("telegram_backup=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn execute(cli: Cli) -> Result<(), Fatal> {
    let config = Config::load(cli.config.as_deref(), cli.overrides())?;
    tracing::debug!(
        server = %config.server,
        output = %config.output_path.display(),
        "Configuration resolved"
    );

    commands::run(&config).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    if let Err(err) = init_tracing() {
        eprintln!("Error: failed to initialise logging: {}", err);
    }

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => {
            eprintln!("Error: {}", fatal);
            ExitCode::from(fatal.exit_code())
        }
    }
}
