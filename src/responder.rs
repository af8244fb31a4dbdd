//! Keyword-triggered advisor replies.
//!
//! Rules are checked in priority order and the first one whose trigger words
//! appear in the query wins. Every reply is a pure function of the tokens and
//! the fetched records.

use crate::models::CoinRecord;
use crate::report::group_thousands;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Sustainability,
    Trending,
    Profitability,
}

struct Rule {
    topic: Topic,
    triggers: &'static [&'static str],
}

const RULES: [Rule; 3] = [
    Rule {
        topic: Topic::Sustainability,
        triggers: &["sustainable", "eco", "green"],
    },
    Rule {
        topic: Topic::Trending,
        triggers: &["trend", "trending", "up"],
    },
    Rule {
        topic: Topic::Profitability,
        triggers: &["profit", "profitable", "invest"],
    },
];

/// Demo sustainability scores out of 10. Only these ids are ever scored.
pub const SUSTAINABILITY_SCORES: &[(&str, u8)] =
    &[("bitcoin", 3), ("ethereum", 6), ("cardano", 9)];

/// Coins ranked above this are not considered for the profitability reply.
pub const PROFIT_MAX_RANK: u32 = 5;

pub const DEFAULT_REPLY: &str =
    "Hmm 🤔 I’m not sure. Try asking about sustainability, trends, or profitability!";
pub const NO_PROFIT_REPLY: &str = "💸 No profitable high-market-cap coins at the moment.";
pub const NO_DATA_REPLY: &str = "📉 No market data available to spot a trend.";

pub fn classify<S: AsRef<str>>(tokens: &[S]) -> Option<Topic> {
    RULES
        .iter()
        .find(|rule| {
            tokens
                .iter()
                .any(|token| rule.triggers.iter().any(|t| *t == token.as_ref()))
        })
        .map(|rule| rule.topic)
}

pub fn select_response<S: AsRef<str>>(tokens: &[S], data: &[CoinRecord]) -> String {
    match classify(tokens) {
        Some(Topic::Sustainability) => sustainability_reply(),
        Some(Topic::Trending) => trending_reply(data),
        Some(Topic::Profitability) => profitability_reply(data),
        None => DEFAULT_REPLY.to_string(),
    }
}

/// Ignores live data: the score table is fixed.
fn sustainability_reply() -> String {
    let mut best: Option<(&str, u8)> = None;
    for &(id, score) in SUSTAINABILITY_SCORES {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((id, score));
        }
    }
    match best {
        Some((id, score)) => format!(
            "🌱 {} is the most sustainable with score {}/10!",
            capitalize(id),
            score
        ),
        None => DEFAULT_REPLY.to_string(),
    }
}

/// Highest 24h change; the earliest record wins a tie.
pub fn top_mover(data: &[CoinRecord]) -> Option<&CoinRecord> {
    let mut best: Option<&CoinRecord> = None;
    for coin in data {
        if best.map_or(true, |top| coin.change_24h() > top.change_24h()) {
            best = Some(coin);
        }
    }
    best
}

fn trending_reply(data: &[CoinRecord]) -> String {
    match top_mover(data) {
        Some(coin) => format!(
            "📈 {} is trending up with {:.2}% change today!",
            coin.name,
            coin.change_24h()
        ),
        None => NO_DATA_REPLY.to_string(),
    }
}

/// First record (provider order) that is top-ranked and rising.
pub fn profitable_pick(data: &[CoinRecord]) -> Option<&CoinRecord> {
    data.iter()
        .find(|coin| coin.rank() <= PROFIT_MAX_RANK && coin.change_24h() > 0.0)
}

fn profitability_reply(data: &[CoinRecord]) -> String {
    match profitable_pick(data) {
        Some(coin) => format!(
            "💰 {} looks profitable: rising and high market cap (${})",
            coin.name,
            group_thousands(coin.market_cap_units())
        ),
        None => NO_PROFIT_REPLY.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
