use crate::config::Config;
use crate::error::ProviderError;
use crate::models::FetchResult;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const API_KEY_PARAM: &str = "x_cg_demo_api_key";
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// A single outbound GET.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        let url = Url::parse(&request.url)
            .map_err(|e| ProviderError::InvalidEndpoint(format!("{}: {}", request.url, e)))?;

        let mut builder = self
            .client
            .get(url)
            .header("accept", "application/json")
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

pub struct MarketDataFetcher<T: Transport> {
    transport: T,
    config: Config,
}

impl MarketDataFetcher<ReqwestTransport> {
    pub fn from_config(config: Config) -> Result<Self, ProviderError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> MarketDataFetcher<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches the configured coins.
    pub async fn fetch(&self) -> Result<FetchResult, ProviderError> {
        self.fetch_markets(
            &self.config.coin_ids,
            &self.config.vs_currency,
            self.config.api_key.as_deref(),
        )
        .await
    }

    /// With a key, the first attempt sends it as a query parameter. A 401
    /// triggers exactly one retry with the key moved into a header.
    pub async fn fetch_markets(
        &self,
        ids: &[String],
        vs_currency: &str,
        api_key: Option<&str>,
    ) -> Result<FetchResult, ProviderError> {
        let mut request = HttpRequest {
            url: self.config.endpoint.clone(),
            query: market_params(ids, vs_currency),
            headers: Vec::new(),
        };

        let response = match api_key {
            Some(key) => {
                request
                    .query
                    .push((API_KEY_PARAM.to_string(), key.to_string()));
                debug!(url = %request.url, "fetching markets with key in query");
                let first = self.transport.get(&request).await?;

                if first.status == StatusCode::UNAUTHORIZED {
                    warn!("provider rejected query-parameter key, retrying with header");
                    request.query.retain(|(name, _)| name != API_KEY_PARAM);
                    request
                        .headers
                        .push((API_KEY_HEADER.to_string(), key.to_string()));
                    self.transport.get(&request).await?
                } else {
                    first
                }
            }
            None => {
                debug!(url = %request.url, "fetching markets without key");
                self.transport.get(&request).await?
            }
        };

        match response.status {
            status if status.is_success() => {
                let records: FetchResult = serde_json::from_str(&response.body)?;
                info!(count = records.len(), "fetched market data");
                Ok(records)
            }
            status => Err(ProviderError::Status {
                status,
                body: response.body,
            }),
        }
    }
}

fn market_params(ids: &[String], vs_currency: &str) -> Vec<(String, String)> {
    vec![
        ("vs_currency".to_string(), vs_currency.to_string()),
        ("ids".to_string(), ids.join(",")),
        ("order".to_string(), "market_cap_desc".to_string()),
        ("per_page".to_string(), ids.len().to_string()),
        ("page".to_string(), "1".to_string()),
        ("sparkline".to_string(), "false".to_string()),
        ("price_change_percentage".to_string(), "24h".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const BODY: &str = r#"[{"id":"bitcoin","name":"Bitcoin","current_price":64000.0,
        "market_cap":1260000000000,"market_cap_rank":1,"price_change_percentage_24h":1.5}]"#;

    struct ScriptedTransport {
        replies: Mutex<VecDeque<(StatusCode, &'static str)>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: &[(StatusCode, &'static str)]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().copied().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            let (status, body) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra request");
            Ok(HttpResponse {
                status,
                body: body.to_string(),
            })
        }
    }

    fn config(api_key: Option<&str>) -> Config {
        Config {
            api_key: api_key.map(str::to_string),
            ..Config::default()
        }
    }

    fn query_value<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn unauthorized_query_key_falls_back_to_header() {
        let transport = ScriptedTransport::new(&[
            (StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#),
            (StatusCode::OK, BODY),
        ]);
        let fetcher = MarketDataFetcher::new(transport, config(Some("demo-key")));

        let records = fetcher.fetch().await.unwrap();
        assert_eq!(records[0].name, "Bitcoin");

        let seen = fetcher.transport.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(query_value(&seen[0], API_KEY_PARAM), Some("demo-key"));
        assert!(seen[0].headers.is_empty());
        assert_eq!(query_value(&seen[1], API_KEY_PARAM), None);
        assert_eq!(
            seen[1].headers,
            vec![(API_KEY_HEADER.to_string(), "demo-key".to_string())]
        );
    }

    #[tokio::test]
    async fn accepted_query_key_needs_one_attempt() {
        let transport = ScriptedTransport::new(&[(StatusCode::OK, BODY)]);
        let fetcher = MarketDataFetcher::new(transport, config(Some("demo-key")));

        fetcher.fetch().await.unwrap();
        assert_eq!(fetcher.transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn no_key_sends_no_auth() {
        let transport = ScriptedTransport::new(&[(StatusCode::OK, BODY)]);
        let fetcher = MarketDataFetcher::new(transport, config(None));

        fetcher.fetch().await.unwrap();
        let seen = fetcher.transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(query_value(&seen[0], API_KEY_PARAM), None);
        assert!(seen[0].headers.is_empty());
        assert_eq!(query_value(&seen[0], "ids"), Some("bitcoin,ethereum,cardano"));
        assert_eq!(query_value(&seen[0], "per_page"), Some("3"));
        assert_eq!(query_value(&seen[0], "order"), Some("market_cap_desc"));
        assert_eq!(query_value(&seen[0], "page"), Some("1"));
        assert_eq!(query_value(&seen[0], "sparkline"), Some("false"));
        assert_eq!(query_value(&seen[0], "price_change_percentage"), Some("24h"));
    }

    #[tokio::test]
    async fn second_unauthorized_is_not_retried() {
        let transport = ScriptedTransport::new(&[
            (StatusCode::UNAUTHORIZED, "nope"),
            (StatusCode::UNAUTHORIZED, "still nope"),
        ]);
        let fetcher = MarketDataFetcher::new(transport, config(Some("demo-key")));

        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("still nope"));
        assert_eq!(fetcher.transport.seen().len(), 2);
    }

    #[tokio::test]
    async fn unauthorized_without_key_is_an_error() {
        let transport = ScriptedTransport::new(&[(StatusCode::UNAUTHORIZED, "key required")]);
        let fetcher = MarketDataFetcher::new(transport, config(None));

        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(fetcher.transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let transport = ScriptedTransport::new(&[(StatusCode::TOO_MANY_REQUESTS, "slow down")]);
        let fetcher = MarketDataFetcher::new(transport, config(Some("demo-key")));

        match fetcher.fetch().await {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(fetcher.transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let transport = ScriptedTransport::new(&[(StatusCode::OK, "<html>")]);
        let fetcher = MarketDataFetcher::new(transport, config(None));

        assert!(matches!(
            fetcher.fetch().await,
            Err(ProviderError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected_before_sending() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let request = HttpRequest {
            url: "not a url".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
        };
        assert!(matches!(
            transport.get(&request).await,
            Err(ProviderError::InvalidEndpoint(_))
        ));
    }
}
