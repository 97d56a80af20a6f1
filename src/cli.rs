//! CLI parsing and command execution
//!
//! This module handles command-line argument parsing and runs the
//! read-merge-write sequence against the configured Vault server.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::backends::VaultClient;
use crate::config::{self, Config, ConfigLayer};
use crate::kv::{self, KvBuilder, PatchSet};
use crate::patch::{self, PatchOutcome};

#[derive(Parser, Debug)]
#[command(name = "vault-patch")]
#[command(about = "Merge key/value pairs into an existing HashiCorp Vault secret", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "VAULT_PATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vault API address [default: https://127.0.0.1:8200]
    #[arg(long, env = "VAULT_ADDR")]
    pub vault_addr: Option<String>,

    /// Vault token (falls back to ~/.vault-token)
    #[arg(long, env = "VAULT_TOKEN", hide_env_values = true)]
    pub vault_token: Option<String>,

    /// Verbosity of logs to use (debug, info, warning, error, ...) [default: info]
    #[arg(long, env = "VAULT_PATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// HTTP request timeout in seconds [default: 60]
    #[arg(long, env = "VAULT_CLIENT_TIMEOUT", value_parser = parse_seconds)]
    pub timeout: Option<u64>,

    /// Path of the secret to patch
    pub path: String,

    /// Fields to set: key=value, key=@file, key=- or a bare - / @file holding
    /// a JSON object. Read from stdin when omitted.
    pub data: Vec<String>,
}

/// Accept plain seconds or the `60s` form the Vault CLI uses
fn parse_seconds(raw: &str) -> Result<u64, String> {
    raw.strip_suffix('s')
        .unwrap_or(raw)
        .parse()
        .map_err(|_| format!("invalid number of seconds: {raw:?}"))
}

impl Cli {
    fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            address: self.vault_addr.clone(),
            token: self.vault_token.clone(),
            log_level: self.log_level.clone(),
            timeout_seconds: self.timeout,
        }
    }
}

/// Resolve the run configuration from flags, environment, config file and
/// the token file in the home directory
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let home = config::home_dir();
    Config::resolve(cli.config_layer(), cli.config.as_deref(), home.as_deref())
        .context("Unable to load CLI config")
}

/// Install the stderr log subscriber at the configured level
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::default().add_directive(LevelFilter::from_level(config.log_level).into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// Parse the data tokens, reading them from `stdin` when none were given
pub fn build_patch(data: &[String], mut stdin: Box<dyn Read>) -> Result<PatchSet> {
    let builder = if data.is_empty() {
        debug!("No data arguments given, reading them from stdin");
        let tokens = kv::split_tokens(&mut stdin).context("Unable to parse data")?;
        let mut builder = KvBuilder::new(stdin).stdin_consumed();
        builder.add(&tokens).context("Unable to parse data")?;
        builder
    } else {
        let mut builder = KvBuilder::new(stdin);
        builder.add(data).context("Unable to parse data")?;
        builder
    };
    Ok(builder.into_map())
}

/// Execute one patch run
pub async fn execute(cli: Cli, config: &Config, stdin: Box<dyn Read>) -> Result<PatchOutcome> {
    let patch = build_patch(&cli.data, stdin)?;
    debug!("Parsed {} field(s) to patch", patch.len());

    let client = VaultClient::from_config(config).context("Unable to create Vault client")?;

    patch::patch_secret(&client, &cli.path, patch).await
}
