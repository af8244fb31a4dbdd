use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Rank used when the provider leaves `market_cap_rank` out.
pub const UNRANKED: u32 = 999;

/// One coin from the `/coins/markets` payload. Optional fields stay optional
/// here; the accessors apply the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinRecord {
    pub fn change_24h(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }

    pub fn rank(&self) -> u32 {
        self.market_cap_rank.unwrap_or(UNRANKED)
    }

    pub fn market_cap_units(&self) -> u64 {
        match self.market_cap {
            Some(cap) if cap.is_finite() && cap > 0.0 => cap.round() as u64,
            _ => 0,
        }
    }
}

/// Records in provider order (descending market cap).
pub type FetchResult = Vec<CoinRecord>;

#[derive(Debug, Clone)]
pub struct CachedFetch {
    pub records: FetchResult,
    pub timestamp: SystemTime,
    pub expires_at: SystemTime,
}

impl CachedFetch {
    pub fn new(records: FetchResult, timestamp: SystemTime, ttl: Duration) -> Self {
        Self {
            records,
            timestamp,
            expires_at: timestamp + ttl,
        }
    }

    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.timestamp).unwrap_or_default()
    }

    /// Valid up to and including `expires_at`.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        now <= self.expires_at
    }
}
