//! クリエイティブセットのコンバージョンルール
//!
//! 広告配信時にクリエイティブに添付される `CreativeSetConversionInfo` から、
//! viewed / clicked の発火成功時に `CreativeSetConversionRule` を組み立てて保存する。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 広告ペイロードに添付されるコンバージョン定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeSetConversionInfo {
    /// `*` をワイルドカードとする URL パターン
    pub url_pattern: String,
    #[serde(rename = "observation_window_days", with = "crate::domain::duration_serde::days")]
    pub observation_window: Duration,
    #[serde(default)]
    pub verifiable_advertiser_public_key: Option<String>,
    /// ID を運ぶ URL を特定するパターン（`/` 始まりは path+query に対して照合）
    #[serde(default)]
    pub resource_id_pattern: Option<String>,
}

/// 保存済みのコンバージョンルール（マッチャーからは読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeSetConversionRule {
    pub creative_set_id: String,
    pub url_pattern: String,
    #[serde(rename = "observation_window_days", with = "crate::domain::duration_serde::days")]
    pub observation_window: Duration,
    #[serde(default)]
    pub verifiable_advertiser_public_key: Option<String>,
    #[serde(default)]
    pub resource_id_pattern: Option<String>,
    /// 保存時刻 + observation_window。`now >= expire_at` で失効
    #[serde(default)]
    pub expire_at: Option<DateTime<Utc>>,
}

impl CreativeSetConversionRule {
    /// 保存時刻 `now` から失効時刻を決めてルールを作る
    pub fn build(creative_set_id: &str, info: &CreativeSetConversionInfo, now: DateTime<Utc>) -> Self {
        Self {
            creative_set_id: creative_set_id.to_string(),
            url_pattern: info.url_pattern.clone(),
            observation_window: info.observation_window,
            verifiable_advertiser_public_key: info.verifiable_advertiser_public_key.clone(),
            resource_id_pattern: info.resource_id_pattern.clone(),
            expire_at: Some(now + info.observation_window),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }

    /// `occurred_at` の広告イベントがまだ観測窓内か（境界ちょうどは窓外）
    pub fn covers(&self, occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now < occurred_at + self.observation_window
    }

    /// verifiable 抽出の前提（公開鍵とリソース ID パターンが両方空でない）
    pub fn is_verifiable(&self) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        non_empty(&self.verifiable_advertiser_public_key) && non_empty(&self.resource_id_pattern)
    }
}
