//! AdEventHandler: 広告イベント 1 件の発火パイプライン
//!
//! validate → 会員ゲート → 履歴読み込み → 順序ゲート → 重複排除 → (served: 許可ルール / viewed: デポジット保存)
//! → 追記 → observer 通知 → コンバージョンルール保存。
//! どの経路でも結果はコールバックと observer に必ず 1 回届く。
//!
//! viewed impression は広告ユニット種別ごとに直列化する。実行中の viewed がある種別へ届いた viewed は
//! FIFO に積み、実行中の発火を終えたスレッドが順に処理する。他の種別・他のイベント種別は待たない。

use crate::domain::ad_event::{self, AdEvent};
use crate::domain::{
    Ad, AdEventType, AdType, AdsConfig, CreativeSetConversionRule, Deposit, FireEventFailure,
    FireEventResult, PermissionDecision, PermissionRules,
};
use crate::ports::outbound::{
    AdEventObserver, AdEventStore, CreativeSetConversionStore, DepositStore, RewardsStatus,
};
use chrono::{DateTime, Utc};
use common::observer::ObserverList;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

/// 発火結果を受け取るコールバック
pub type FireEventCallback = Box<dyn FnOnce(FireEventResult) + Send + 'static>;

pub struct AdEventHandlerDeps {
    pub ad_event_store: Arc<dyn AdEventStore>,
    pub deposit_store: Arc<dyn DepositStore>,
    pub creative_set_conversion_store: Arc<dyn CreativeSetConversionStore>,
    pub rewards_status: Arc<dyn RewardsStatus>,
    pub clock: Arc<dyn Clock>,
    pub log: Arc<dyn Log>,
}

/// callback が panic しても実行中フラグを残さない
struct InFlightGuard<'a> {
    handler: &'a AdEventHandler,
    ad_type: AdType,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        // 正常終了時は drain_viewed_queue がキューのロック内で下ろす
        if thread::panicking() {
            let mut queues = self.handler.lock_viewed_queues();
            queues.entry(self.ad_type).or_default().in_flight = false;
        }
    }
}

struct PendingViewed {
    ad: Ad,
    callback: FireEventCallback,
}

#[derive(Default)]
struct ViewedQueue {
    in_flight: bool,
    pending: VecDeque<PendingViewed>,
}

pub struct AdEventHandler {
    deps: AdEventHandlerDeps,
    always_trigger_events_for_non_members: bool,
    permission_rules: HashMap<AdType, PermissionRules>,
    observers: ObserverList<dyn AdEventObserver>,
    viewed_queues: Mutex<HashMap<AdType, ViewedQueue>>,
}

impl AdEventHandler {
    pub fn new(config: &AdsConfig, deps: AdEventHandlerDeps) -> Self {
        let permission_rules = AdType::ALL
            .iter()
            .map(|t| (*t, PermissionRules::from_settings(&config.permission_rules_for(*t))))
            .collect();
        Self {
            deps,
            always_trigger_events_for_non_members: config.always_trigger_events_for_non_members,
            permission_rules,
            observers: ObserverList::new(),
            viewed_queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_observer(&self, observer: &Arc<dyn AdEventObserver>) {
        self.observers.add_observer(observer);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn AdEventObserver>) {
        self.observers.remove_observer(observer);
    }

    /// 1 件発火する。viewed が同種別で実行中なら積んで即座に戻る
    pub fn fire_event(
        &self,
        ad: &Ad,
        event_type: AdEventType,
        callback: impl FnOnce(FireEventResult) + Send + 'static,
    ) {
        if event_type != AdEventType::ViewedImpression {
            callback(self.fire(ad, event_type));
            return;
        }

        {
            let mut queues = self.lock_viewed_queues();
            let queue = queues.entry(ad.ad_type).or_default();
            if queue.in_flight {
                queue.pending.push_back(PendingViewed {
                    ad: ad.clone(),
                    callback: Box::new(callback),
                });
                return;
            }
            queue.in_flight = true;
        }

        let _guard = InFlightGuard {
            handler: self,
            ad_type: ad.ad_type,
        };
        callback(self.fire(ad, event_type));
        self.drain_viewed_queue(ad.ad_type);
    }

    /// 積まれた viewed を FIFO で処理し、空になったら実行中フラグを下ろす
    fn drain_viewed_queue(&self, ad_type: AdType) {
        loop {
            let next = {
                let mut queues = self.lock_viewed_queues();
                let queue = queues.entry(ad_type).or_default();
                match queue.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        queue.in_flight = false;
                        return;
                    }
                }
            };
            let result = self.fire(&next.ad, AdEventType::ViewedImpression);
            (next.callback)(result);
        }
    }

    // キューは常に整合した状態で更新するので、poison されても中身はそのまま使える
    fn lock_viewed_queues(&self) -> MutexGuard<'_, HashMap<AdType, ViewedQueue>> {
        self.viewed_queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// パイプラインを実行して observer へ通知し、結果を返す
    fn fire(&self, ad: &Ad, event_type: AdEventType) -> FireEventResult {
        let now = self.deps.clock.now();
        let is_member = self.deps.rewards_status.has_joined_rewards();

        match self.run_pipeline(ad, event_type, is_member, now) {
            Ok(()) => {
                let _ = self.deps.log.log(
                    &LogRecord::new(LogLevel::Info, format!("fired {} event", event_type))
                        .layer("usecase")
                        .kind("ad_event")
                        .field("ad_type", ad.ad_type.as_str())
                        .field("placement_id", ad.placement_id.as_str())
                        .field("creative_instance_id", ad.creative_instance_id.as_str()),
                );
                self.notify_fired(ad, event_type);
                self.maybe_save_creative_set_conversion(ad, event_type, is_member, now);
                FireEventResult::succeeded(&ad.placement_id, event_type)
            }
            Err(failure) => {
                self.log_failure(ad, event_type, &failure);
                self.observers
                    .notify(|o| o.on_failed_to_fire_event(ad, event_type, &failure));
                FireEventResult::failed(&ad.placement_id, event_type, failure)
            }
        }
    }

    fn run_pipeline(
        &self,
        ad: &Ad,
        event_type: AdEventType,
        is_member: bool,
        now: DateTime<Utc>,
    ) -> Result<(), FireEventFailure> {
        if !ad.is_valid() {
            return Err(FireEventFailure::InvalidAd);
        }

        if !is_member && !self.is_allowed_for_non_member(ad, event_type) {
            return Err(FireEventFailure::NotAllowedForNonMember);
        }

        let ad_events = self
            .deps
            .ad_event_store
            .get_unexpired(ad.ad_type, now)
            .map_err(|e| FireEventFailure::Storage(e.to_string()))?;

        if is_member {
            match event_type {
                AdEventType::ViewedImpression if !ad_event::was_served(ad, &ad_events) => {
                    return Err(FireEventFailure::NotServed(ad.placement_id.clone()));
                }
                AdEventType::Clicked if !ad_event::was_viewed(ad, &ad_events) => {
                    return Err(FireEventFailure::NotViewed(ad.placement_id.clone()));
                }
                _ => {}
            }
        }

        if ad_event::should_deduplicate(ad, &ad_events, event_type) {
            return Err(FireEventFailure::Duplicate {
                event_type,
                placement_id: ad.placement_id.clone(),
            });
        }

        match event_type {
            AdEventType::ServedImpression => {
                if let Some(rules) = self.permission_rules.get(&ad.ad_type) {
                    if let PermissionDecision::Denied { rule, reason } = rules.has_permission(&ad_events, now) {
                        return Err(FireEventFailure::PermissionDenied { rule, reason });
                    }
                }
            }
            AdEventType::ViewedImpression => {
                self.deps
                    .deposit_store
                    .save(&Deposit::from_ad(ad))
                    .map_err(|e| FireEventFailure::DepositFailed(e.to_string()))?;
            }
            AdEventType::Clicked => {}
        }

        self.deps
            .ad_event_store
            .append(&AdEvent::build(ad, event_type.confirmation_type(), now))
            .map_err(|e| FireEventFailure::Storage(e.to_string()))
    }

    /// 非会員は clicked のみ、常時発火が有効かつコンバージョン設定を持つ広告に限る
    fn is_allowed_for_non_member(&self, ad: &Ad, event_type: AdEventType) -> bool {
        event_type == AdEventType::Clicked
            && self.always_trigger_events_for_non_members
            && ad.has_creative_set_conversion()
    }

    fn notify_fired(&self, ad: &Ad, event_type: AdEventType) {
        match event_type {
            AdEventType::ServedImpression => self.observers.notify(|o| o.on_did_fire_served_event(ad)),
            AdEventType::ViewedImpression => self.observers.notify(|o| o.on_did_fire_viewed_event(ad)),
            AdEventType::Clicked => self.observers.notify(|o| o.on_did_fire_clicked_event(ad)),
        }
    }

    /// 会員の viewed / 非会員の clicked でコンバージョンルールを保存する
    fn maybe_save_creative_set_conversion(
        &self,
        ad: &Ad,
        event_type: AdEventType,
        is_member: bool,
        now: DateTime<Utc>,
    ) {
        let should_save = match event_type {
            AdEventType::ViewedImpression => is_member,
            AdEventType::Clicked => !is_member,
            AdEventType::ServedImpression => false,
        };
        let Some(info) = ad.creative_set_conversion.as_ref().filter(|_| should_save) else {
            return;
        };

        let rule = CreativeSetConversionRule::build(&ad.creative_set_id, info, now);
        if let Err(e) = self.deps.creative_set_conversion_store.save(&rule) {
            let _ = self.deps.log.log(
                &LogRecord::new(LogLevel::Warn, "failed to save creative set conversion")
                    .layer("usecase")
                    .kind("conversion")
                    .field("creative_set_id", ad.creative_set_id.as_str())
                    .field("error", e.to_string()),
            );
        }
    }

    fn log_failure(&self, ad: &Ad, event_type: AdEventType, failure: &FireEventFailure) {
        if failure.is_defect() {
            self.log_defect(&failure.to_string(), ad, event_type);
            return;
        }
        let kind = match failure {
            FireEventFailure::PermissionDenied { .. } => "permission",
            _ => "ad_event",
        };
        let mut record = LogRecord::new(
            LogLevel::Info,
            format!("failed to fire {} event: {}", event_type, failure),
        )
        .layer("usecase")
        .kind(kind)
        .field("ad_type", ad.ad_type.as_str())
        .field("placement_id", ad.placement_id.as_str());
        if let FireEventFailure::PermissionDenied { rule, .. } = failure {
            record = record.field("rule", rule.as_str());
        }
        let _ = self.deps.log.log(&record);
    }

    fn log_defect(&self, message: &str, ad: &Ad, event_type: AdEventType) {
        let _ = self.deps.log.log(
            &LogRecord::new(LogLevel::Error, message)
                .layer("usecase")
                .kind("defect")
                .field("event_type", event_type.as_str())
                .field("ad_type", ad.ad_type.as_str())
                .field("placement_id", ad.placement_id.as_str())
                .field("creative_instance_id", ad.creative_instance_id.as_str()),
        );
    }
}
