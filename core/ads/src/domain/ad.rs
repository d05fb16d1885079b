//! 広告ペイロードとデポジット

use crate::domain::ad_type::AdType;
use crate::domain::creative_set_conversion::CreativeSetConversionInfo;
use serde::{Deserialize, Serialize};

/// 発火対象の広告（配信時のクリエイティブ情報 + 配置 ID）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub ad_type: AdType,
    pub placement_id: String,
    pub creative_instance_id: String,
    pub creative_set_id: String,
    pub campaign_id: String,
    pub advertiser_id: String,
    pub segment: String,
    pub target_url: String,
    /// viewed 時に保存するデポジットの額
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub creative_set_conversion: Option<CreativeSetConversionInfo>,
}

impl Ad {
    /// ID・セグメント・遷移先がすべて空でないこと
    pub fn is_valid(&self) -> bool {
        [
            &self.placement_id,
            &self.creative_instance_id,
            &self.creative_set_id,
            &self.campaign_id,
            &self.advertiser_id,
            &self.segment,
            &self.target_url,
        ]
        .iter()
        .all(|s| !s.trim().is_empty())
    }

    pub fn has_creative_set_conversion(&self) -> bool {
        self.creative_set_conversion.is_some()
    }
}

/// viewed impression に紐づく報酬単位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub creative_instance_id: String,
    pub value: f64,
}

impl Deposit {
    pub fn from_ad(ad: &Ad) -> Self {
        Self {
            creative_instance_id: ad.creative_instance_id.clone(),
            value: ad.value,
        }
    }
}
