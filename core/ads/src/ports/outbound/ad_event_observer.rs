//! 広告イベント発火の observer

use crate::domain::{Ad, AdEventType, FireEventFailure};

/// 発火結果の通知先。既定実装は何もしない
pub trait AdEventObserver: Send + Sync {
    fn on_did_fire_served_event(&self, _ad: &Ad) {}

    fn on_did_fire_viewed_event(&self, _ad: &Ad) {}

    fn on_did_fire_clicked_event(&self, _ad: &Ad) {}

    fn on_failed_to_fire_event(&self, _ad: &Ad, _event_type: AdEventType, _failure: &FireEventFailure) {}
}
