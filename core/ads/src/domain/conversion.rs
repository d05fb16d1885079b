//! コンバージョン（observer へ渡す一時的な結果）

use crate::domain::ad_event::AdEvent;
use crate::domain::ad_type::{AdType, ConfirmationType};
use serde::{Deserialize, Serialize};

/// どの種類の接触から帰属したか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionActionType {
    ViewThrough,
    ClickThrough,
}

impl ConversionActionType {
    /// viewed → view-through、clicked → click-through。それ以外は帰属元にならない
    pub fn from_confirmation_type(confirmation_type: ConfirmationType) -> Option<Self> {
        match confirmation_type {
            ConfirmationType::ViewedImpression => Some(Self::ViewThrough),
            ConfirmationType::Clicked => Some(Self::ClickThrough),
            _ => None,
        }
    }
}

/// 広告主が検証に使う ID 付きコンバージョン
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiableConversion {
    pub id: String,
    pub advertiser_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub ad_type: AdType,
    pub creative_instance_id: String,
    pub creative_set_id: String,
    pub campaign_id: String,
    pub advertiser_id: String,
    pub segment: String,
    pub action_type: ConversionActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable: Option<VerifiableConversion>,
}

impl Conversion {
    pub fn build(
        ad_event: &AdEvent,
        action_type: ConversionActionType,
        verifiable: Option<VerifiableConversion>,
    ) -> Self {
        Self {
            ad_type: ad_event.ad_type,
            creative_instance_id: ad_event.creative_instance_id.clone(),
            creative_set_id: ad_event.creative_set_id.clone(),
            campaign_id: ad_event.campaign_id.clone(),
            advertiser_id: ad_event.advertiser_id.clone(),
            segment: ad_event.segment.clone(),
            action_type,
            verifiable,
        }
    }

    pub fn is_verifiable(&self) -> bool {
        self.verifiable.is_some()
    }
}
