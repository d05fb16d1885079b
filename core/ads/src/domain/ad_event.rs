//! 広告イベント履歴の 1 件と、履歴に対する存在チェック

use crate::domain::ad::Ad;
use crate::domain::ad_type::{AdEventType, AdType, ConfirmationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 記録済みの広告イベント（追記のみ・不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdEvent {
    pub ad_type: AdType,
    pub confirmation_type: ConfirmationType,
    pub placement_id: String,
    pub creative_instance_id: String,
    pub creative_set_id: String,
    pub campaign_id: String,
    pub advertiser_id: String,
    pub segment: String,
    pub created_at: DateTime<Utc>,
}

impl AdEvent {
    pub fn build(ad: &Ad, confirmation_type: ConfirmationType, created_at: DateTime<Utc>) -> Self {
        Self {
            ad_type: ad.ad_type,
            confirmation_type,
            placement_id: ad.placement_id.clone(),
            creative_instance_id: ad.creative_instance_id.clone(),
            creative_set_id: ad.creative_set_id.clone(),
            campaign_id: ad.campaign_id.clone(),
            advertiser_id: ad.advertiser_id.clone(),
            segment: ad.segment.clone(),
            created_at,
        }
    }

    /// 同じ広告インスタンスについて別の確認種別のイベントを作る
    pub fn with_confirmation_type(&self, confirmation_type: ConfirmationType, created_at: DateTime<Utc>) -> Self {
        Self {
            confirmation_type,
            created_at,
            ..self.clone()
        }
    }
}

/// `ad` と同じ ad_type / placement_id で `confirmation_type` のイベントが記録済みか
pub fn has_fired(ad: &Ad, ad_events: &[AdEvent], confirmation_type: ConfirmationType) -> bool {
    ad_events.iter().any(|e| {
        e.confirmation_type == confirmation_type
            && e.ad_type == ad.ad_type
            && e.placement_id == ad.placement_id
    })
}

pub fn was_served(ad: &Ad, ad_events: &[AdEvent]) -> bool {
    has_fired(ad, ad_events, ConfirmationType::ServedImpression)
}

pub fn was_viewed(ad: &Ad, ad_events: &[AdEvent]) -> bool {
    has_fired(ad, ad_events, ConfirmationType::ViewedImpression)
}

/// 同一 (ad_type, confirmation_type, placement_id) が既にあれば重複発火
pub fn should_deduplicate(ad: &Ad, ad_events: &[AdEvent], event_type: AdEventType) -> bool {
    has_fired(ad, ad_events, event_type.confirmation_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ad(placement_id: &str) -> Ad {
        Ad {
            ad_type: AdType::InlineContentAd,
            placement_id: placement_id.to_string(),
            creative_instance_id: "instance".to_string(),
            creative_set_id: "set".to_string(),
            campaign_id: "campaign".to_string(),
            advertiser_id: "advertiser".to_string(),
            segment: "untargeted".to_string(),
            target_url: "https://brave.com".to_string(),
            value: 0.0,
            creative_set_conversion: None,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_was_served_matches_placement_id() {
        let events = vec![AdEvent::build(&ad("p1"), ConfirmationType::ServedImpression, at())];
        assert!(was_served(&ad("p1"), &events));
        assert!(!was_served(&ad("p2"), &events));
        assert!(!was_viewed(&ad("p1"), &events));
    }

    #[test]
    fn test_has_fired_ignores_other_ad_types() {
        let mut other = ad("p1");
        other.ad_type = AdType::NotificationAd;
        let events = vec![AdEvent::build(&other, ConfirmationType::ViewedImpression, at())];
        assert!(!was_viewed(&ad("p1"), &events));
    }

    #[test]
    fn test_should_deduplicate() {
        let events = vec![AdEvent::build(&ad("p1"), ConfirmationType::Clicked, at())];
        assert!(should_deduplicate(&ad("p1"), &events, AdEventType::Clicked));
        assert!(!should_deduplicate(&ad("p1"), &events, AdEventType::ViewedImpression));
    }

    #[test]
    fn test_with_confirmation_type_keeps_identity() {
        let viewed = AdEvent::build(&ad("p1"), ConfirmationType::ViewedImpression, at());
        let later = at() + chrono::Duration::hours(1);
        let conversion = viewed.with_confirmation_type(ConfirmationType::Conversion, later);
        assert_eq!(conversion.creative_instance_id, viewed.creative_instance_id);
        assert_eq!(conversion.confirmation_type, ConfirmationType::Conversion);
        assert_eq!(conversion.created_at, later);
    }
}
