use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trail_search::config::{
    ENV_MASTER_KEY, ENV_SEARCH_KEY_NAME, ENV_SEARCH_URL, ENV_TOKEN_TTL_SECS,
};
use trail_search::seed::DEFAULT_IMAGE_DIR;
use trail_search::{
    resolve_key_by_name, seed_categories, Config, ConfigError, FsRecordStore, HttpSearchClient,
    TokenIssuer,
};

/// Operator commands for the trail search integration.
#[derive(Parser)]
#[command(name = "trail-search", version, about)]
struct Cli {
    /// Base URL of the search service.
    #[arg(long, env = ENV_SEARCH_URL, global = true)]
    search_url: Option<String>,

    /// Master key of the search service.
    #[arg(long, env = ENV_MASTER_KEY, hide_env_values = true, global = true)]
    master_key: Option<String>,

    /// Name of the API key that signs tenant tokens [default: Default Search API Key].
    #[arg(long, env = ENV_SEARCH_KEY_NAME, global = true)]
    search_key_name: Option<String>,

    /// Lifetime of issued tokens in seconds; tokens never expire when unset.
    #[arg(long, env = ENV_TOKEN_TTL_SECS, global = true)]
    token_ttl_secs: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the search service configuration and resolve the signing key.
    Check,
    /// Print a tenant token for a user.
    Token {
        /// Id of the user record.
        user_id: String,
    },
    /// Create the default categories with their images.
    Seed {
        /// Directory holding the records.
        #[arg(long, default_value = "pb_data")]
        data_dir: PathBuf,
        /// Directory holding `<category>.jpg` images.
        #[arg(long, default_value = DEFAULT_IMAGE_DIR)]
        images: PathBuf,
    },
}

impl Cli {
    /// Raw value given for an environment variable, by flag or by environment.
    fn lookup(&self, var: &str) -> Option<String> {
        let value = match var {
            ENV_SEARCH_URL => &self.search_url,
            ENV_MASTER_KEY => &self.master_key,
            ENV_SEARCH_KEY_NAME => &self.search_key_name,
            ENV_TOKEN_TTL_SECS => &self.token_ttl_secs,
            _ => return None,
        };
        value.clone()
    }

    fn config(&self) -> Result<Config, ConfigError> {
        Config::from_lookup(|var| self.lookup(var))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Check => {
            let config = cli.config()?;
            let client = HttpSearchClient::from_config(&config)?;
            let key = resolve_key_by_name(&client, &config.search_key_name)
                .with_context(|| format!("checking {}", client.host()))?;
            info!(host = client.host(), key_uid = %key.uid, "search service ready");
            println!("ok: {:?} resolved to {}", config.search_key_name, key.uid);
        }
        Command::Token { user_id } => {
            let config = cli.config()?;
            let client = Arc::new(HttpSearchClient::from_config(&config)?);
            let issuer = TokenIssuer::resolve(client, config.search_key_name.clone())?
                .with_ttl(config.token_ttl);
            println!("{}", issuer.issue_token(user_id)?);
        }
        Command::Seed { data_dir, images } => {
            let store = FsRecordStore::new(data_dir);
            let created = seed_categories(&store, images)
                .with_context(|| format!("seeding categories into {}", data_dir.display()))?;
            println!("created {} categories", created.len());
        }
    }
    Ok(())
}
