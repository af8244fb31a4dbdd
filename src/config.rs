//! Runtime configuration.
//!
//! Values come from CLI flags with environment fallbacks (a `.env` file is
//! loaded first by `main`). Everything downstream receives a plain [`Config`].

use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use std::time::Duration;

pub static CACHE_TTL: Duration = Duration::new(300, 0); // 5 minutes

pub const DEFAULT_ENDPOINT: &str = "https://api.coingecko.com/api/v3/coins/markets";
pub const DEFAULT_COIN_IDS: &str = "bitcoin,ethereum,cardano";
pub const DEFAULT_VS_CURRENCY: &str = "usd";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub coin_ids: Vec<String>,
    pub vs_currency: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            coin_ids: parse_coin_ids(DEFAULT_COIN_IDS),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// ChainMetrics - crypto market snapshot with a keyword-driven advisor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Market data endpoint
    #[arg(long, env = "COINGECKO_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Comma-separated coin identifiers
    #[arg(long, env = "CRYPTO_IDS", default_value = DEFAULT_COIN_IDS)]
    pub ids: String,

    /// Display currency code
    #[arg(long = "vs-currency", env = "VS_CURRENCY", default_value = DEFAULT_VS_CURRENCY)]
    pub vs_currency: String,

    /// Demo API key for the provider
    #[arg(long = "api-key", env = "COINGECKO_DEMO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the market snapshot
    Snapshot,
    /// Answer a single question
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Interactive session (default)
    Chat,
}

impl TryFrom<&Args> for Config {
    type Error = ConfigError;

    /// An empty id list is rejected: the provider would answer with an
    /// unfiltered page.
    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let coin_ids = parse_coin_ids(&args.ids);
        if coin_ids.is_empty() {
            return Err(ConfigError::NoCoinIds);
        }
        Ok(Self {
            endpoint: args.endpoint.trim().to_string(),
            coin_ids,
            vs_currency: args.vs_currency.trim().to_ascii_lowercase(),
            api_key: args
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            timeout: Duration::from_secs(args.timeout),
        })
    }
}

/// Splits a comma-separated id list; blanks are dropped and the first
/// occurrence of a duplicate wins.
pub fn parse_coin_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
