//! 広告ユニット種別と確認種別

use serde::{Deserialize, Serialize};

/// 広告ユニット種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    NotificationAd,
    NewTabPageAd,
    PromotedContentAd,
    InlineContentAd,
    SearchResultAd,
}

impl AdType {
    pub const ALL: [AdType; 5] = [
        Self::NotificationAd,
        Self::NewTabPageAd,
        Self::PromotedContentAd,
        Self::InlineContentAd,
        Self::SearchResultAd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotificationAd => "notification_ad",
            Self::NewTabPageAd => "new_tab_page_ad",
            Self::PromotedContentAd => "promoted_content_ad",
            Self::InlineContentAd => "inline_content_ad",
            Self::SearchResultAd => "search_result_ad",
        }
    }
}

impl std::fmt::Display for AdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 広告イベント履歴に記録される確認種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
    ServedImpression,
    ViewedImpression,
    Clicked,
    Dismissed,
    Landed,
    Conversion,
    SavedAd,
    LikedAd,
    DislikedAd,
    MarkAdAsInappropriate,
}

impl ConfirmationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServedImpression => "served_impression",
            Self::ViewedImpression => "viewed_impression",
            Self::Clicked => "clicked",
            Self::Dismissed => "dismissed",
            Self::Landed => "landed",
            Self::Conversion => "conversion",
            Self::SavedAd => "saved_ad",
            Self::LikedAd => "liked_ad",
            Self::DislikedAd => "disliked_ad",
            Self::MarkAdAsInappropriate => "mark_ad_as_inappropriate",
        }
    }
}

impl std::fmt::Display for ConfirmationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 呼び出し側が発火するイベント種別（served → viewed → clicked）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdEventType {
    ServedImpression,
    ViewedImpression,
    Clicked,
}

impl AdEventType {
    pub fn confirmation_type(&self) -> ConfirmationType {
        match self {
            Self::ServedImpression => ConfirmationType::ServedImpression,
            Self::ViewedImpression => ConfirmationType::ViewedImpression,
            Self::Clicked => ConfirmationType::Clicked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.confirmation_type().as_str()
    }
}

impl std::fmt::Display for AdEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_as_str() {
        for ad_type in AdType::ALL {
            let json = serde_json::to_string(&ad_type).unwrap();
            assert_eq!(json, format!("\"{}\"", ad_type.as_str()));
        }
        let ct: ConfirmationType = serde_json::from_str("\"mark_ad_as_inappropriate\"").unwrap();
        assert_eq!(ct, ConfirmationType::MarkAdAsInappropriate);
    }

    #[test]
    fn test_event_type_maps_to_confirmation_type() {
        assert_eq!(
            AdEventType::ViewedImpression.confirmation_type(),
            ConfirmationType::ViewedImpression
        );
        assert_eq!(AdEventType::Clicked.to_string(), "clicked");
    }
}
