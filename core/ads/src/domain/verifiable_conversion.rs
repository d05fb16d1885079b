//! verifiable コンバージョン ID の抽出
//!
//! 探索順: ID を運ぶ URL のクエリパラメータ → HTML の `{resource_id}-id` 要素 → `<meta name="ad-conversion-id">`。
//! どれにも無ければ None（通常のコンバージョンとして扱う。エラーではない）。

use crate::domain::config::ConversionSettings;
use crate::domain::conversion::VerifiableConversion;
use crate::domain::creative_set_conversion::CreativeSetConversionRule;
use crate::domain::url_pattern::matches_pattern;
use scraper::{Html, Selector};
use url::{Position, Url};

pub const CONVERSION_ID_META_TAG_NAME: &str = "ad-conversion-id";

/// パターンの照合対象。`/` 始まりは path+query、それ以外は URL 全体
fn match_target(url: &Url, pattern: &str) -> String {
    if pattern.starts_with('/') {
        url[Position::BeforePath..Position::AfterQuery].to_string()
    } else {
        url.as_str().to_string()
    }
}

/// resource_id_pattern に一致する最初の URL（ID を運ぶ URL）
pub fn carrier_url<'a>(redirect_chain: &'a [Url], resource_id_pattern: &str) -> Option<&'a Url> {
    redirect_chain
        .iter()
        .find(|url| matches_pattern(&match_target(url, resource_id_pattern), resource_id_pattern))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn id_from_query(url: &Url, id_parameter_name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == id_parameter_name)
        .and_then(|(_, value)| non_empty(&value))
}

pub fn id_from_html_element(document: &Html, element_id: &str) -> Option<String> {
    let selector = Selector::parse("[id]").ok()?;
    document
        .select(&selector)
        .find(|el| el.value().id() == Some(element_id))
        .and_then(|el| non_empty(&el.text().collect::<String>()))
}

pub fn id_from_meta_tag(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta").ok()?;
    document
        .select(&selector)
        .find(|el| el.value().attr("name") == Some(CONVERSION_ID_META_TAG_NAME))
        .and_then(|el| el.value().attr("content"))
        .and_then(non_empty)
}

/// ルールとナビゲーションから verifiable ID を引き出す
pub fn extract(
    rule: &CreativeSetConversionRule,
    redirect_chain: &[Url],
    html: Option<&str>,
    settings: &ConversionSettings,
) -> Option<VerifiableConversion> {
    if !rule.is_verifiable() {
        return None;
    }
    let advertiser_public_key = rule.verifiable_advertiser_public_key.as_deref()?.trim();
    let resource_id_pattern = rule.resource_id_pattern.as_deref()?.trim();

    let carrier = carrier_url(redirect_chain, resource_id_pattern)?;

    let id = id_from_query(carrier, &settings.id_parameter_name).or_else(|| {
        let document = Html::parse_document(html?);
        id_from_html_element(&document, &settings.html_element_id())
            .or_else(|| id_from_meta_tag(&document))
    })?;

    Some(VerifiableConversion {
        id,
        advertiser_public_key: advertiser_public_key.to_string(),
    })
}
