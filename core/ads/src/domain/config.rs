//! エンジン設定（ads.json 用の設定型）
//!
//! 許可ルールの上限・コンバージョン上限・非会員向けの常時発火フラグ等を保持する。
//! 仕様上の camelCase 名（maxPerDay 等）も alias として受け付ける。
//! 許可ルールの値に `null` を書くと、そのルールを無効にする。

use crate::domain::ad_type::AdType;
use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// 既定の広告イベント保持期間（日）
pub const DEFAULT_AD_EVENT_RETENTION_DAYS: u32 = 90;
/// 既定のクリエイティブセットあたりコンバージョン上限
pub const DEFAULT_CREATIVE_SET_CONVERSION_CAP: u32 = 1;
pub const DEFAULT_ID_PARAMETER_NAME: &str = "conversion_id";
pub const DEFAULT_RESOURCE_ID: &str = "ad-conversion";

/// 1 つの広告ユニット種別に適用する許可ルールの設定（None はルール無効）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionRuleSettings {
    pub max_per_day: Option<u32>,
    pub min_wait_time_ads_per_hour: Option<u32>,
    pub max_per_hour: Option<u32>,
}

impl PermissionRuleSettings {
    /// 組み込みの既定値
    pub fn builtin(ad_type: AdType) -> Self {
        match ad_type {
            AdType::NotificationAd => Self {
                max_per_day: Some(100),
                min_wait_time_ads_per_hour: Some(10),
                max_per_hour: None,
            },
            AdType::NewTabPageAd | AdType::PromotedContentAd => Self {
                max_per_day: Some(20),
                min_wait_time_ads_per_hour: None,
                max_per_hour: Some(4),
            },
            AdType::InlineContentAd => Self {
                max_per_day: Some(20),
                min_wait_time_ads_per_hour: None,
                max_per_hour: Some(6),
            },
            AdType::SearchResultAd => Self {
                max_per_day: Some(40),
                min_wait_time_ads_per_hour: None,
                max_per_hour: Some(10),
            },
        }
    }
}

/// 設定ファイル側の上書き値
///
/// 外側の `None` は未指定（下位の値を使う）、`Some(None)` はルール無効。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionRuleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_per_day: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_wait_time_ads_per_hour: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_per_hour: Option<Option<u32>>,
}

impl PermissionRuleOverrides {
    /// `self` で未指定の項目を `base` から補う
    pub fn or(self, base: PermissionRuleOverrides) -> Self {
        Self {
            max_per_day: self.max_per_day.or(base.max_per_day),
            min_wait_time_ads_per_hour: self.min_wait_time_ads_per_hour.or(base.min_wait_time_ads_per_hour),
            max_per_hour: self.max_per_hour.or(base.max_per_hour),
        }
    }

    /// 未指定の項目を組み込み既定値で埋めて実効値にする
    pub fn resolve(self, builtin: PermissionRuleSettings) -> PermissionRuleSettings {
        PermissionRuleSettings {
            max_per_day: self.max_per_day.unwrap_or(builtin.max_per_day),
            min_wait_time_ads_per_hour: self
                .min_wait_time_ads_per_hour
                .unwrap_or(builtin.min_wait_time_ads_per_hour),
            max_per_hour: self.max_per_hour.unwrap_or(builtin.max_per_hour),
        }
    }
}

/// コンバージョン判定の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSettings {
    /// 0 は上限なし
    pub creative_set_conversion_cap: u32,
    /// verifiable ID を運ぶクエリパラメータ名
    pub id_parameter_name: String,
    /// HTML 要素 `{resource_id}-id` の resource_id
    pub resource_id: String,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            creative_set_conversion_cap: DEFAULT_CREATIVE_SET_CONVERSION_CAP,
            id_parameter_name: DEFAULT_ID_PARAMETER_NAME.to_string(),
            resource_id: DEFAULT_RESOURCE_ID.to_string(),
        }
    }
}

impl ConversionSettings {
    pub fn html_element_id(&self) -> String {
        format!("{}-id", self.resource_id)
    }
}

/// ads.json のルート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdsConfig {
    /// 全種別に共通で上書きする値
    pub permission_rules_default: PermissionRuleOverrides,
    /// 種別ごとの上書き（default より優先）
    pub permission_rules_by_ad_type: HashMap<AdType, PermissionRuleOverrides>,
    pub conversions: ConversionSettings,
    pub always_trigger_events_for_non_members: bool,
    #[serde(skip)]
    pub ad_event_retention: Duration,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            permission_rules_default: PermissionRuleOverrides::default(),
            permission_rules_by_ad_type: HashMap::new(),
            conversions: ConversionSettings::default(),
            always_trigger_events_for_non_members: false,
            ad_event_retention: Duration::days(i64::from(DEFAULT_AD_EVENT_RETENTION_DAYS)),
        }
    }
}

impl AdsConfig {
    /// 種別ごとの実効値: 種別上書き → 共通 → 組み込み既定
    pub fn permission_rules_for(&self, ad_type: AdType) -> PermissionRuleSettings {
        let by_type = self
            .permission_rules_by_ad_type
            .get(&ad_type)
            .copied()
            .unwrap_or_default();
        by_type
            .or(self.permission_rules_default)
            .resolve(PermissionRuleSettings::builtin(ad_type))
    }

    /// JSON 文字列からパース（ファイル読みは adapter で行う）
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: AdsConfigRaw = serde_json::from_str(json)?;
        let defaults = ConversionSettings::default();

        let rules_raw = raw.permission_rules.unwrap_or_default();
        let flat = PermissionRuleOverrides {
            max_per_day: raw.max_per_day,
            min_wait_time_ads_per_hour: raw.min_wait_time_ads_per_hour,
            max_per_hour: raw.max_per_hour,
        };
        let permission_rules_default = rules_raw
            .default
            .map(PermissionRuleOverrides::from)
            .unwrap_or_default()
            .or(flat);
        let permission_rules_by_ad_type = rules_raw
            .by_ad_type
            .into_iter()
            .map(|(k, v)| (k, v.into()))
            .collect();

        let conversions_raw = raw.conversions.unwrap_or_default();
        let conversions = ConversionSettings {
            creative_set_conversion_cap: conversions_raw
                .creative_set_conversion_cap
                .or(raw.creative_set_conversion_cap)
                .unwrap_or(defaults.creative_set_conversion_cap),
            id_parameter_name: conversions_raw
                .id_parameter_name
                .unwrap_or(defaults.id_parameter_name),
            resource_id: conversions_raw.resource_id.unwrap_or(defaults.resource_id),
        };

        let retention_days = raw
            .ad_event_retention_days
            .unwrap_or(DEFAULT_AD_EVENT_RETENTION_DAYS);

        Ok(AdsConfig {
            permission_rules_default,
            permission_rules_by_ad_type,
            conversions,
            always_trigger_events_for_non_members: raw
                .always_trigger_events_for_non_members
                .unwrap_or(false),
            ad_event_retention: Duration::days(i64::from(retention_days)),
        })
    }
}

/// serde 用の内部構造（省略可能な項目を Option で受ける）
#[derive(Debug, Default, Deserialize)]
struct AdsConfigRaw {
    permission_rules: Option<PermissionRulesRaw>,
    conversions: Option<ConversionSettingsRaw>,
    #[serde(alias = "alwaysTriggerEventsForNonMembers")]
    always_trigger_events_for_non_members: Option<bool>,
    #[serde(alias = "adEventRetentionDays")]
    ad_event_retention_days: Option<u32>,
    // トップレベルに置かれた共通の上限値
    #[serde(default, alias = "maxPerDay", deserialize_with = "explicit")]
    max_per_day: Option<Option<u32>>,
    #[serde(default, alias = "minWaitTimeBetweenAdsPerHour", deserialize_with = "explicit")]
    min_wait_time_ads_per_hour: Option<Option<u32>>,
    #[serde(default, alias = "maxPerHour", deserialize_with = "explicit")]
    max_per_hour: Option<Option<u32>>,
    #[serde(alias = "creativeSetConversionCap")]
    creative_set_conversion_cap: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct PermissionRulesRaw {
    default: Option<PermissionRuleSettingsRaw>,
    #[serde(default)]
    by_ad_type: HashMap<AdType, PermissionRuleSettingsRaw>,
}

#[derive(Debug, Default, Deserialize)]
struct PermissionRuleSettingsRaw {
    #[serde(default, alias = "maxPerDay", deserialize_with = "explicit")]
    max_per_day: Option<Option<u32>>,
    #[serde(default, alias = "minWaitTimeBetweenAdsPerHour", deserialize_with = "explicit")]
    min_wait_time_ads_per_hour: Option<Option<u32>>,
    #[serde(default, alias = "maxPerHour", deserialize_with = "explicit")]
    max_per_hour: Option<Option<u32>>,
}

/// キーがあれば `Some`（値が `null` なら `Some(None)`）。キーが無ければ `default` で `None`。
fn explicit<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
struct ConversionSettingsRaw {
    #[serde(alias = "creativeSetConversionCap")]
    creative_set_conversion_cap: Option<u32>,
    id_parameter_name: Option<String>,
    resource_id: Option<String>,
}

impl From<PermissionRuleSettingsRaw> for PermissionRuleOverrides {
    fn from(r: PermissionRuleSettingsRaw) -> Self {
        PermissionRuleOverrides {
            max_per_day: r.max_per_day,
            min_wait_time_ads_per_hour: r.min_wait_time_ads_per_hour,
            max_per_hour: r.max_per_hour,
        }
    }
}
