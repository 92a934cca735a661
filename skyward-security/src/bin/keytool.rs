//! Operator tool for the Skyward key store
//!
//! Usage:
//!   skyward-keytool generate payments
//!   skyward-keytool list
//!   echo '{"user":"bob","password":"hunter2"}' | skyward-keytool encrypt-record -
//!
//! Configuration comes from `--config`, `.env` and `SKYWARD_SECURITY_*`
//! environment variables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skyward_logging::{try_init, LogFormat};
use skyward_security::{Record, SecurityConfig, SecurityManager};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Parser)]
#[command(name = "skyward-keytool", version, about = "Manage Skyward encryption keys")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "console")]
    log_format: LogFormat,

    /// Operator name recorded in the audit trail
    #[arg(long, global = true, env = "USER", default_value = "operator")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a key, replacing any existing key with that name
    Generate { name: String },
    /// List key names and fingerprints
    List,
    /// Encrypt the sensitive fields of a JSON object ("-" reads stdin)
    EncryptRecord { record: String },
    /// Decrypt a record produced by encrypt-record ("-" reads stdin)
    DecryptRecord { record: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A failed init only means a subscriber is already installed
    let _ = try_init("skyward-keytool", "warn", cli.log_format);

    let config = SecurityConfig::load(cli.config.as_deref())
        .context("Failed to load security configuration")?;
    info!(key_store = %config.key_store_path.display(), "Configuration loaded");

    let manager = SecurityManager::new(config)
        .await
        .context("Failed to initialize security manager")?;

    match cli.command {
        Command::Generate { name } => {
            let fingerprint = manager.generate_key(&name, &cli.user).await?;
            println!("{}\t{}", name, fingerprint);
        }
        Command::List => {
            for key in manager.list_keys().await? {
                println!("{}\t{}", key.name, key.fingerprint);
            }
        }
        Command::EncryptRecord { record } => {
            let record = read_record(&record).await?;
            let encrypted = manager.encrypt_sensitive_data(record).await?;
            println!("{}", serde_json::to_string_pretty(&encrypted)?);
        }
        Command::DecryptRecord { record } => {
            let record = read_record(&record).await?;
            let decrypted = manager.decrypt_sensitive_data(record).await?;
            println!("{}", serde_json::to_string_pretty(&decrypted)?);
        }
    }

    Ok(())
}

async fn read_record(arg: &str) -> Result<Record> {
    let input = if arg == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read record from stdin")?;
        buf
    } else {
        arg.to_string()
    };

    serde_json::from_str(&input).context("Record must be a JSON object")
}
