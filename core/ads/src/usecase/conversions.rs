//! Conversions: ナビゲーション（リダイレクトチェーン + HTML）を過去の viewed / clicked へ帰属させる
//!
//! 1 回の呼び出しでクリエイティブセットごとに高々 1 件。候補は新しい順で、同時刻なら clicked を優先する。
//! 成立したコンバージョンは `conversion` 広告イベントとして履歴へ追記し、上限判定はその件数で行う。
//! Rewards 非会員では verifiable ID を抽出せず、通常のコンバージョンとして扱う。

use crate::domain::url_pattern;
use crate::domain::verifiable_conversion;
use crate::domain::{
    AdEvent, AdsConfig, ConfirmationType, Conversion, ConversionActionType, ConversionSettings,
    CreativeSetConversionRule,
};
use crate::ports::outbound::{
    AdEventStore, ConversionsObserver, CreativeSetConversionStore, RewardsStatus,
};
use chrono::{DateTime, Utc};
use common::observer::ObserverList;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

pub struct ConversionsDeps {
    pub ad_event_store: Arc<dyn AdEventStore>,
    pub creative_set_conversion_store: Arc<dyn CreativeSetConversionStore>,
    pub rewards_status: Arc<dyn RewardsStatus>,
    pub clock: Arc<dyn Clock>,
    pub log: Arc<dyn Log>,
}

pub struct Conversions {
    deps: ConversionsDeps,
    settings: ConversionSettings,
    observers: ObserverList<dyn ConversionsObserver>,
}

impl Conversions {
    pub fn new(config: &AdsConfig, deps: ConversionsDeps) -> Self {
        Self {
            deps,
            settings: config.conversions.clone(),
            observers: ObserverList::new(),
        }
    }

    pub fn add_observer(&self, observer: &Arc<dyn ConversionsObserver>) {
        self.observers.add_observer(observer);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn ConversionsObserver>) {
        self.observers.remove_observer(observer);
    }

    /// 成立したコンバージョンを返す（observer にも同じものが届く）
    pub fn maybe_convert(&self, redirect_chain: &[Url], html: Option<&str>) -> Vec<Conversion> {
        if redirect_chain.is_empty() {
            return Vec::new();
        }
        let now = self.deps.clock.now();

        let rules = match self.deps.creative_set_conversion_store.get_unexpired(now) {
            Ok(rules) => rules,
            Err(e) => {
                self.warn("failed to get creative set conversions", &e.to_string());
                return Vec::new();
            }
        };
        let matching_rules: Vec<CreativeSetConversionRule> = rules
            .into_iter()
            .filter(|r| url_pattern::matches_any(redirect_chain, &r.url_pattern))
            .collect();
        if matching_rules.is_empty() {
            let _ = self.deps.log.log(
                &LogRecord::new(LogLevel::Debug, "no matching creative set conversions")
                    .layer("usecase")
                    .kind("conversion"),
            );
            return Vec::new();
        }

        let ad_events = match self.deps.ad_event_store.get_all_unexpired(now) {
            Ok(events) => events,
            Err(e) => {
                self.warn("failed to get ad events", &e.to_string());
                return Vec::new();
            }
        };

        self.convert_candidates(&matching_rules, &ad_events, redirect_chain, html, now)
    }

    fn convert_candidates(
        &self,
        matching_rules: &[CreativeSetConversionRule],
        ad_events: &[AdEvent],
        redirect_chain: &[Url],
        html: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<Conversion> {
        let mut conversion_counts: HashMap<&str, u32> = HashMap::new();
        for e in ad_events
            .iter()
            .filter(|e| e.confirmation_type == ConfirmationType::Conversion)
        {
            *conversion_counts.entry(e.creative_set_id.as_str()).or_default() += 1;
        }

        let cap = self.settings.creative_set_conversion_cap;
        let is_member = self.deps.rewards_status.has_joined_rewards();
        let mut converted_creative_sets: HashSet<&str> = HashSet::new();
        let mut conversions = Vec::new();

        for (ad_event, action_type) in candidates(ad_events) {
            let creative_set_id = ad_event.creative_set_id.as_str();
            if converted_creative_sets.contains(creative_set_id) {
                continue;
            }
            let count = conversion_counts.get(creative_set_id).copied().unwrap_or(0);
            if cap > 0 && count >= cap {
                continue;
            }
            let Some(rule) = matching_rules
                .iter()
                .find(|r| r.creative_set_id == creative_set_id && r.covers(ad_event.created_at, now))
            else {
                continue;
            };

            converted_creative_sets.insert(creative_set_id);

            let verifiable = if is_member {
                verifiable_conversion::extract(rule, redirect_chain, html, &self.settings)
            } else {
                None
            };
            let conversion = Conversion::build(ad_event, action_type, verifiable);

            let conversion_event = ad_event.with_confirmation_type(ConfirmationType::Conversion, now);
            if let Err(e) = self.deps.ad_event_store.append(&conversion_event) {
                let _ = self.deps.log.log(
                    &LogRecord::new(LogLevel::Error, "failed to record conversion")
                        .layer("usecase")
                        .kind("defect")
                        .field("creative_instance_id", ad_event.creative_instance_id.as_str())
                        .field("error", e.to_string()),
                );
                self.observers
                    .notify(|o| o.on_failed_to_convert_ad(&ad_event.creative_instance_id));
                continue;
            }
            *conversion_counts.entry(creative_set_id).or_default() += 1;

            let _ = self.deps.log.log(
                &LogRecord::new(LogLevel::Info, "converted ad")
                    .layer("usecase")
                    .kind("conversion")
                    .field("creative_set_id", creative_set_id)
                    .field("creative_instance_id", ad_event.creative_instance_id.as_str())
                    .field("verifiable", conversion.is_verifiable()),
            );
            self.observers.notify(|o| o.on_did_convert_ad(&conversion));
            conversions.push(conversion);
        }

        conversions
    }

    fn warn(&self, message: &str, error: &str) {
        let _ = self.deps.log.log(
            &LogRecord::new(LogLevel::Warn, message)
                .layer("usecase")
                .kind("conversion")
                .field("error", error),
        );
    }
}

/// viewed / clicked だけを新しい順に並べる（同時刻は clicked が先）
fn candidates(ad_events: &[AdEvent]) -> Vec<(&AdEvent, ConversionActionType)> {
    let mut out: Vec<(&AdEvent, ConversionActionType)> = ad_events
        .iter()
        .filter_map(|e| ConversionActionType::from_confirmation_type(e.confirmation_type).map(|a| (e, a)))
        .collect();
    out.sort_by(|(a, a_action), (b, b_action)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| action_rank(*a_action).cmp(&action_rank(*b_action)))
    });
    out
}

fn action_rank(action_type: ConversionActionType) -> u8 {
    match action_type {
        ConversionActionType::ClickThrough => 0,
        ConversionActionType::ViewThrough => 1,
    }
}
