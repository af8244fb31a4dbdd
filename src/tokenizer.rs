//! Word tokenization for user queries.
//!
//! Treebank-style splitting: punctuation becomes its own token, decimals,
//! hyphenated and slash-joined words (`green/eco`) stay whole, and contractions split off their clitic
//! (`what's` -> `what`, `'s`; `don't` -> `do`, `n't`).

use once_cell::sync::Lazy;
use regex::Regex;

pub type QueryTokens = Vec<String>;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)+|\w+(?:['/-]\w+)*|'\w+|[^\w\s]").expect("valid token regex")
});

const CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

pub fn tokenize(query: &str) -> QueryTokens {
    let normalized = query.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    let mut tokens = Vec::new();
    for m in TOKEN.find_iter(&normalized) {
        split_contraction(m.as_str(), &mut tokens);
    }
    tokens
}

fn split_contraction(word: &str, out: &mut QueryTokens) {
    if let Some(stem) = word.strip_suffix("n't").filter(|s| !s.is_empty()) {
        out.push(stem.to_string());
        out.push("n't".to_string());
        return;
    }
    if let Some(idx) = word.find('\'').filter(|&i| i > 0) {
        let (stem, rest) = word.split_at(idx);
        if CLITICS.contains(&rest) {
            out.push(stem.to_string());
            out.push(rest.to_string());
            return;
        }
    }
    out.push(word.to_string());
}
