use crate::error::ProviderError;
use crate::models::CoinRecord;

pub const TITLE: &str = "🤖 ChainMetrics";
pub const TAGLINE: &str = "Your professional crypto advisor with sustainability insights!";
pub const DISCLAIMER: &str =
    "⚠️ Disclaimer: Crypto is risky—always do your own research before investing!";

/// Groups an integer with `,` every three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn fetch_failure_line(err: &ProviderError) -> String {
    format!("Failed to fetch data from CoinGecko: {}", err)
}

pub fn snapshot_line(coin: &CoinRecord) -> String {
    let price = coin
        .current_price
        .map(|p| format!("${}", p))
        .unwrap_or_else(|| "n/a".to_string());
    format!("{}: {} (24h: {:.2}%)", coin.name, price, coin.change_24h())
}

pub fn render_snapshot(records: &[CoinRecord]) -> String {
    let mut out = String::from("📊 Market Snapshot\n");
    for coin in records {
        out.push_str(&snapshot_line(coin));
        out.push('\n');
    }
    out
}
