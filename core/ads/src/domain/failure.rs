//! 広告イベント発火の結果

use crate::domain::ad_type::AdEventType;
use crate::domain::permission_rules::PermissionRuleId;

/// 発火失敗の理由
///
/// InvalidAd / DepositFailed / Storage は不具合として扱う。それ以外は想定内のポリシー結果。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FireEventFailure {
    #[error("the ad is invalid")]
    InvalidAd,
    #[error("not allowed for users who have not joined Rewards")]
    NotAllowedForNonMember,
    #[error("an ad was not served for placement id {0}")]
    NotServed(String),
    #[error("an ad was not viewed for placement id {0}")]
    NotViewed(String),
    #[error("deduplicated {event_type} event for placement id {placement_id}")]
    Duplicate {
        event_type: AdEventType,
        placement_id: String,
    },
    #[error("not allowed due to {rule} permission rule: {reason}")]
    PermissionDenied {
        rule: PermissionRuleId,
        reason: String,
    },
    #[error("failed to save deposit: {0}")]
    DepositFailed(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl FireEventFailure {
    /// 不具合として記録すべき失敗か
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::InvalidAd | Self::DepositFailed(_) | Self::Storage(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// コールバックへ渡す結果（success, placement_id, event_type）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEventResult {
    pub success: bool,
    pub placement_id: String,
    pub event_type: AdEventType,
    pub failure: Option<FireEventFailure>,
}

impl FireEventResult {
    pub fn succeeded(placement_id: &str, event_type: AdEventType) -> Self {
        Self {
            success: true,
            placement_id: placement_id.to_string(),
            event_type,
            failure: None,
        }
    }

    pub fn failed(placement_id: &str, event_type: AdEventType, failure: FireEventFailure) -> Self {
        Self {
            success: false,
            placement_id: placement_id.to_string(),
            event_type,
            failure: Some(failure),
        }
    }
}
