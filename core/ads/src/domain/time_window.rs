//! 時間窓内のイベント数え上げ（許可ルールの土台）
//!
//! 窓は `(since, ...]` の半開区間。`since` ちょうどのイベントは窓外として数えない。
//! 呼び出し側で一度取得した履歴をルールごとに使い回す。

use crate::domain::ad_event::AdEvent;
use crate::domain::ad_type::ConfirmationType;
use chrono::{DateTime, Duration, Utc};

/// `now` から `window` だけ遡った窓の開始時刻
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now - window
}

pub fn count(events: &[AdEvent], confirmation_type: ConfirmationType, since: DateTime<Utc>) -> usize {
    events
        .iter()
        .filter(|e| e.confirmation_type == confirmation_type && e.created_at > since)
        .count()
}

pub fn has_any(events: &[AdEvent], confirmation_type: ConfirmationType, since: DateTime<Utc>) -> bool {
    events
        .iter()
        .any(|e| e.confirmation_type == confirmation_type && e.created_at > since)
}

/// 指定種別で最も新しいイベント（履歴の並び順には依存しない）
pub fn most_recent(events: &[AdEvent], confirmation_type: ConfirmationType) -> Option<&AdEvent> {
    events
        .iter()
        .filter(|e| e.confirmation_type == confirmation_type)
        .max_by_key(|e| e.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ad_type::AdType;
    use chrono::TimeZone;

    fn event(confirmation_type: ConfirmationType, created_at: DateTime<Utc>) -> AdEvent {
        AdEvent {
            ad_type: AdType::NotificationAd,
            confirmation_type,
            placement_id: format!("placement-{}", created_at.timestamp_millis()),
            creative_instance_id: "instance".to_string(),
            creative_set_id: "set".to_string(),
            campaign_id: "campaign".to_string(),
            advertiser_id: "advertiser".to_string(),
            segment: "untargeted".to_string(),
            created_at,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_count_excludes_event_at_window_start() {
        let now = t0() + Duration::days(1);
        let events = vec![
            event(ConfirmationType::ServedImpression, t0()),
            event(ConfirmationType::ServedImpression, t0() + Duration::milliseconds(1)),
        ];
        let since = window_start(now, Duration::days(1));
        assert_eq!(count(&events, ConfirmationType::ServedImpression, since), 1);
    }

    #[test]
    fn test_count_filters_by_confirmation_type() {
        let events = vec![
            event(ConfirmationType::ServedImpression, t0()),
            event(ConfirmationType::ViewedImpression, t0()),
            event(ConfirmationType::Clicked, t0()),
        ];
        let since = t0() - Duration::hours(1);
        assert_eq!(count(&events, ConfirmationType::ViewedImpression, since), 1);
        assert!(has_any(&events, ConfirmationType::Clicked, since));
        assert!(!has_any(&events, ConfirmationType::Dismissed, since));
    }

    #[test]
    fn test_has_any_is_false_for_empty_history() {
        assert!(!has_any(&[], ConfirmationType::ServedImpression, t0()));
        assert_eq!(count(&[], ConfirmationType::ServedImpression, t0()), 0);
    }

    #[test]
    fn test_most_recent_ignores_order() {
        let events = vec![
            event(ConfirmationType::ServedImpression, t0() + Duration::minutes(5)),
            event(ConfirmationType::ServedImpression, t0()),
            event(ConfirmationType::ViewedImpression, t0() + Duration::minutes(9)),
        ];
        let latest = most_recent(&events, ConfirmationType::ServedImpression).unwrap();
        assert_eq!(latest.created_at, t0() + Duration::minutes(5));
    }
}
