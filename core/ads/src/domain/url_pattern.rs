//! `*` ワイルドカードの URL パターン照合
//!
//! `*` は任意の部分文字列（空を含む）。大文字小文字は区別し、文字列全体で一致を取る。

use regex::Regex;
use url::Url;

fn pattern_to_regex(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?s)^{}$", body)).ok()
}

pub fn matches_pattern(text: &str, pattern: &str) -> bool {
    match pattern_to_regex(pattern) {
        Some(re) => re.is_match(text),
        None => false,
    }
}

/// リダイレクトチェーンのうち最初に一致した URL
pub fn first_match<'a>(redirect_chain: &'a [Url], pattern: &str) -> Option<&'a Url> {
    let re = pattern_to_regex(pattern)?;
    redirect_chain.iter().find(|url| re.is_match(url.as_str()))
}

pub fn matches_any(redirect_chain: &[Url], pattern: &str) -> bool {
    first_match(redirect_chain, pattern).is_some()
}
