use anyhow::{Context, Result};
use chainmetrics::api::{MarketDataFetcher, ReqwestTransport};
use chainmetrics::cache::MarketCache;
use chainmetrics::config::{Args, Command, Config, CACHE_TTL};
use chainmetrics::error::ProviderError;
use chainmetrics::logging::init_logging;
use chainmetrics::models::FetchResult;
use chainmetrics::report::{fetch_failure_line, render_snapshot, DISCLAIMER, TAGLINE, TITLE};
use chainmetrics::responder::select_response;
use chainmetrics::tokenizer::tokenize;
use clap::Parser;
use dotenv::dotenv;
use std::io::Write;
use std::time::SystemTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

struct App {
    fetcher: MarketDataFetcher<ReqwestTransport>,
    cache: MarketCache,
    cache_key: String,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let cache_key = MarketCache::key(&config.coin_ids, &config.vs_currency);
        let fetcher =
            MarketDataFetcher::from_config(config).context("Failed to build HTTP client")?;
        Ok(Self {
            fetcher,
            cache: MarketCache::new(CACHE_TTL),
            cache_key,
        })
    }

    async fn market_data(&mut self) -> Result<FetchResult, ProviderError> {
        let fetcher = &self.fetcher;
        self.cache
            .get_or_refresh(&self.cache_key, SystemTime::now(), || fetcher.fetch())
            .await
    }

    /// A failed fetch ends the run: no stale data, no partial output.
    async fn market_data_or_exit(&mut self) -> FetchResult {
        match self.market_data().await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "market data fetch failed");
                eprintln!("{}", fetch_failure_line(&e));
                std::process::exit(1);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging("chainmetrics=info");

    let args = Args::parse();
    let config = Config::try_from(&args)?;
    info!(
        coins = config.coin_ids.len(),
        vs_currency = %config.vs_currency,
        keyed = config.api_key.is_some(),
        "starting"
    );
    let mut app = App::new(config)?;

    match args.command.unwrap_or(Command::Chat) {
        Command::Snapshot => {
            let data = app.market_data_or_exit().await;
            println!("{}\n", TITLE);
            print!("{}", render_snapshot(&data));
        }
        Command::Ask { query } => {
            let data = app.market_data_or_exit().await;
            let query = query.join(" ");
            println!("{}", select_response(&tokenize(&query), &data));
        }
        Command::Chat => chat(&mut app).await?,
    }

    println!("\n{}", DISCLAIMER);
    Ok(())
}

async fn chat(app: &mut App) -> Result<()> {
    let data = app.market_data_or_exit().await;
    println!("{}", TITLE);
    println!("{}\n", TAGLINE);
    println!("{}", render_snapshot(&data));
    println!("Ask me something about crypto... (type 'quit' to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            break;
        }

        match app.market_data().await {
            Ok(data) => println!("{}", select_response(&tokenize(query), &data)),
            Err(e) => {
                error!(error = %e, "market data refresh failed");
                println!("{}", fetch_failure_line(&e));
            }
        }
    }
    Ok(())
}
