use crate::error::ProviderError;
use crate::models::{CachedFetch, FetchResult};
use std::{collections::HashMap, future::Future, time::Duration, time::SystemTime};
use tracing::debug;

/// In-process market data cache. Entries are keyed by the full request
/// parameter set and never outlive the process.
pub struct MarketCache {
    ttl: Duration,
    entries: HashMap<String, CachedFetch>,
}

impl MarketCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn key(coin_ids: &[String], vs_currency: &str) -> String {
        format!("{}|{}", coin_ids.join(","), vs_currency)
    }

    pub fn get(&self, key: &str, now: SystemTime) -> Option<&FetchResult> {
        self.fresh_entry(key, now).map(|entry| &entry.records)
    }

    fn fresh_entry(&self, key: &str, now: SystemTime) -> Option<&CachedFetch> {
        self.entries.get(key).filter(|entry| entry.is_fresh(now))
    }

    /// Returns the cached records for `key`, or runs `refresh` and stores its
    /// result stamped with `now`. A failed refresh leaves the stale entry out.
    pub async fn get_or_refresh<F, Fut>(
        &mut self,
        key: &str,
        now: SystemTime,
        refresh: F,
    ) -> Result<FetchResult, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchResult, ProviderError>>,
    {
        if let Some(entry) = self.fresh_entry(key, now) {
            debug!(key, age_secs = entry.age(now).as_secs(), "market cache hit");
            return Ok(entry.records.clone());
        }

        debug!(key, "market cache miss");
        self.entries.remove(key);
        let records = refresh().await?;
        self.entries.insert(
            key.to_string(),
            CachedFetch::new(records.clone(), now, self.ttl),
        );
        Ok(records)
    }
}
