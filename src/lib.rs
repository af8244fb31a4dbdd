pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod responder;
pub mod tokenizer;

pub use api::{MarketDataFetcher, ReqwestTransport, Transport};
pub use cache::MarketCache;
pub use config::Config;
pub use error::ProviderError;
pub use models::{CoinRecord, FetchResult};
pub use responder::select_response;
pub use tokenizer::tokenize;
