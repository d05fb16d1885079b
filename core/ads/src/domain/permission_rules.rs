//! 配信許可ルール
//!
//! 各ルールは `(履歴, now) -> 許可/拒否理由` の純粋関数。served impression の前に全ルールの AND を取り、
//! 拒否時は最初に失敗したルールの ID を返す。

use crate::domain::ad_event::AdEvent;
use crate::domain::ad_type::ConfirmationType;
use crate::domain::config::PermissionRuleSettings;
use crate::domain::time_window;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// ルール識別子（診断ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionRuleId {
    PerDay,
    MinimumWaitTime,
    PerHour,
}

impl PermissionRuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerDay => "per_day",
            Self::MinimumWaitTime => "minimum_wait_time",
            Self::PerHour => "per_hour",
        }
    }
}

impl std::fmt::Display for PermissionRuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1 つの許可ルール
///
/// `ad_events` は判定対象の広告ユニット種別に絞り込み済みの履歴。
pub trait PermissionRule: Send + Sync {
    fn id(&self) -> PermissionRuleId;
    /// 許可なら Ok、拒否なら人間向けの理由
    fn check(&self, ad_events: &[AdEvent], now: DateTime<Utc>) -> Result<(), String>;
}

/// 直近 24 時間の served impression 数が上限未満
#[derive(Debug, Clone)]
pub struct PerDayPermissionRule {
    pub max_per_day: u32,
}

impl PermissionRule for PerDayPermissionRule {
    fn id(&self) -> PermissionRuleId {
        PermissionRuleId::PerDay
    }

    fn check(&self, ad_events: &[AdEvent], now: DateTime<Utc>) -> Result<(), String> {
        let since = time_window::window_start(now, Duration::days(1));
        let count = time_window::count(ad_events, ConfirmationType::ServedImpression, since);
        if count < self.max_per_day as usize {
            Ok(())
        } else {
            Err(format!(
                "{} ads served within the last day reached the cap of {}",
                count, self.max_per_day
            ))
        }
    }
}

/// 直近の served impression から `60分 / ads_per_hour` 以上空いている
#[derive(Debug, Clone)]
pub struct MinimumWaitTimePermissionRule {
    pub ads_per_hour: u32,
}

impl MinimumWaitTimePermissionRule {
    pub fn wait_time(&self) -> Option<Duration> {
        if self.ads_per_hour == 0 {
            return None;
        }
        Some(Duration::milliseconds(
            Duration::hours(1).num_milliseconds() / i64::from(self.ads_per_hour),
        ))
    }
}

impl PermissionRule for MinimumWaitTimePermissionRule {
    fn id(&self) -> PermissionRuleId {
        PermissionRuleId::MinimumWaitTime
    }

    fn check(&self, ad_events: &[AdEvent], now: DateTime<Utc>) -> Result<(), String> {
        // 0 はユーザーがこの種別を無効にした状態
        let Some(wait_time) = self.wait_time() else {
            return Err("ads per hour is set to zero".to_string());
        };
        let since = time_window::window_start(now, wait_time);
        if time_window::has_any(ad_events, ConfirmationType::ServedImpression, since) {
            Err(format!(
                "must wait {}s between served ads",
                wait_time.num_seconds()
            ))
        } else {
            Ok(())
        }
    }
}

/// 直近 1 時間の served impression 数が上限未満
#[derive(Debug, Clone)]
pub struct PerHourPermissionRule {
    pub max_per_hour: u32,
}

impl PermissionRule for PerHourPermissionRule {
    fn id(&self) -> PermissionRuleId {
        PermissionRuleId::PerHour
    }

    fn check(&self, ad_events: &[AdEvent], now: DateTime<Utc>) -> Result<(), String> {
        let since = time_window::window_start(now, Duration::hours(1));
        let count = time_window::count(ad_events, ConfirmationType::ServedImpression, since);
        if count < self.max_per_hour as usize {
            Ok(())
        } else {
            Err(format!(
                "{} ads served within the last hour reached the cap of {}",
                count, self.max_per_hour
            ))
        }
    }
}

/// 判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Allowed,
    Denied { rule: PermissionRuleId, reason: String },
}

impl PermissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// 有効なルールの合成（AND）
pub struct PermissionRules {
    rules: Vec<Box<dyn PermissionRule>>,
}

impl PermissionRules {
    pub fn new(rules: Vec<Box<dyn PermissionRule>>) -> Self {
        Self { rules }
    }

    /// 設定で値が指定されたルールだけを per-day → minimum-wait → per-hour の順に組む
    pub fn from_settings(settings: &PermissionRuleSettings) -> Self {
        let mut rules: Vec<Box<dyn PermissionRule>> = Vec::new();
        if let Some(max_per_day) = settings.max_per_day {
            rules.push(Box::new(PerDayPermissionRule { max_per_day }));
        }
        if let Some(ads_per_hour) = settings.min_wait_time_ads_per_hour {
            rules.push(Box::new(MinimumWaitTimePermissionRule { ads_per_hour }));
        }
        if let Some(max_per_hour) = settings.max_per_hour {
            rules.push(Box::new(PerHourPermissionRule { max_per_hour }));
        }
        Self::new(rules)
    }

    pub fn rule_ids(&self) -> Vec<PermissionRuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn has_permission(&self, ad_events: &[AdEvent], now: DateTime<Utc>) -> PermissionDecision {
        for rule in &self.rules {
            if let Err(reason) = rule.check(ad_events, now) {
                return PermissionDecision::Denied {
                    rule: rule.id(),
                    reason,
                };
            }
        }
        PermissionDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ad_type::AdType;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn served(created_at: DateTime<Utc>) -> AdEvent {
        AdEvent {
            ad_type: AdType::InlineContentAd,
            confirmation_type: ConfirmationType::ServedImpression,
            placement_id: format!("placement-{}", created_at.timestamp_millis()),
            creative_instance_id: "instance".to_string(),
            creative_set_id: "set".to_string(),
            campaign_id: "campaign".to_string(),
            advertiser_id: "advertiser".to_string(),
            segment: "untargeted".to_string(),
            created_at,
        }
    }

    fn served_n(n: u32, at: DateTime<Utc>) -> Vec<AdEvent> {
        (0..n).map(|_| served(at)).collect()
    }

    #[test]
    fn per_day_allows_if_there_are_no_ad_events() {
        let rule = PerDayPermissionRule { max_per_day: 20 };
        assert!(rule.check(&[], t0()).is_ok());
    }

    #[test]
    fn per_day_allows_if_does_not_exceed_cap() {
        let rule = PerDayPermissionRule { max_per_day: 20 };
        assert!(rule.check(&served_n(19, t0()), t0()).is_ok());
    }

    #[test]
    fn per_day_allows_if_does_not_exceed_cap_after_1_day() {
        let rule = PerDayPermissionRule { max_per_day: 20 };
        assert!(rule.check(&served_n(20, t0()), t0() + Duration::days(1)).is_ok());
    }

    #[test]
    fn per_day_denies_if_exceeds_cap_within_1_day() {
        let rule = PerDayPermissionRule { max_per_day: 20 };
        let now = t0() + Duration::days(1) - Duration::milliseconds(1);
        assert!(rule.check(&served_n(20, t0()), now).is_err());
    }

    #[test]
    fn per_day_ignores_non_served_events() {
        let rule = PerDayPermissionRule { max_per_day: 1 };
        let mut viewed = served(t0());
        viewed.confirmation_type = ConfirmationType::ViewedImpression;
        assert!(rule.check(&[viewed], t0()).is_ok());
    }

    #[test]
    fn minimum_wait_time_allows_if_there_are_no_ad_events() {
        let rule = MinimumWaitTimePermissionRule { ads_per_hour: 5 };
        assert!(rule.check(&[], t0()).is_ok());
    }

    #[test]
    fn minimum_wait_time_allows_after_wait_time() {
        let rule = MinimumWaitTimePermissionRule { ads_per_hour: 5 };
        let events = vec![served(t0())];
        assert!(rule.check(&events, t0() + Duration::minutes(12)).is_ok());
    }

    #[test]
    fn minimum_wait_time_denies_before_wait_time() {
        let rule = MinimumWaitTimePermissionRule { ads_per_hour: 5 };
        let events = vec![served(t0())];
        let now = t0() + Duration::minutes(12) - Duration::milliseconds(1);
        assert!(rule.check(&events, now).is_err());
    }

    #[test]
    fn minimum_wait_time_denies_when_ads_per_hour_is_zero() {
        let rule = MinimumWaitTimePermissionRule { ads_per_hour: 0 };
        assert!(rule.check(&[], t0()).is_err());
    }

    #[test]
    fn per_hour_denies_at_cap_within_1_hour() {
        let rule = PerHourPermissionRule { max_per_hour: 2 };
        let events = served_n(2, t0());
        assert!(rule.check(&events, t0() + Duration::minutes(59)).is_err());
        assert!(rule.check(&events, t0() + Duration::hours(1)).is_ok());
    }

    #[test]
    fn rules_from_settings_skip_disabled_rules() {
        let rules = PermissionRules::from_settings(&PermissionRuleSettings {
            max_per_day: Some(10),
            min_wait_time_ads_per_hour: None,
            max_per_hour: Some(3),
        });
        assert_eq!(
            rules.rule_ids(),
            vec![PermissionRuleId::PerDay, PermissionRuleId::PerHour]
        );
        assert!(PermissionRules::from_settings(&PermissionRuleSettings::default())
            .has_permission(&served_n(1000, t0()), t0())
            .is_allowed());
    }

    #[test]
    fn rules_report_first_failing_rule() {
        let rules = PermissionRules::from_settings(&PermissionRuleSettings {
            max_per_day: Some(1),
            min_wait_time_ads_per_hour: Some(5),
            max_per_hour: Some(1),
        });
        let decision = rules.has_permission(&[served(t0())], t0() + Duration::minutes(1));
        match decision {
            PermissionDecision::Denied { rule, reason } => {
                assert_eq!(rule, PermissionRuleId::PerDay);
                assert!(reason.contains("cap of 1"));
            }
            PermissionDecision::Allowed => panic!("expected denial"),
        }
    }

    #[test]
    fn rules_allow_when_every_rule_passes() {
        let rules = PermissionRules::from_settings(&PermissionRuleSettings {
            max_per_day: Some(2),
            min_wait_time_ads_per_hour: Some(5),
            max_per_hour: Some(2),
        });
        let decision = rules.has_permission(&[served(t0())], t0() + Duration::minutes(12));
        assert_eq!(decision, PermissionDecision::Allowed);
    }
}
